//! Concrete HTTP-backed bodies for the `StageInvoker`/`FunctionInvoker`
//! collaborator traits `completer-core` declares but deliberately does not
//! implement.

pub mod errors;
pub mod function_invoker;
pub mod stage_invoker;

pub use errors::InvokerError;
pub use function_invoker::HttpFunctionInvoker;
pub use stage_invoker::HttpStageInvoker;
