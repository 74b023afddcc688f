//! In-process dataflow graph engine: a test double for a remote cloud
//! threads / FaaS orchestration service. Builds and resolves a DAG of
//! stages, runs a stage invoker or an external HTTP completion, propagates
//! success/failure along edges, and lets a caller block on a chosen stage.

pub mod cell;
pub mod combinators;
pub mod completer;
pub mod config;
pub mod datum;
pub mod errors;
pub mod events;
pub mod external;
pub mod external_http;
pub mod graph;
pub mod ids;
pub mod invoker;
pub mod node;
pub mod result;
pub mod scheduler;

pub use combinators::{
    all_of::all_of, any_of::any_of, apply::then_apply, combine::then_combine,
    compose::then_compose, delay::delay,
    either::{accept_either, apply_to_either},
    exceptionally::exceptionally,
    invoke_function::invoke_function, supply::{completed_value, supply},
    when_complete::{handle, when_complete},
};
pub use completer::Completer;
pub use config::CompleterConfig;
pub use datum::{Datum, ErrorKind, Headers, HttpMethod};
pub use errors::{CompleterError, WaitError};
pub use events::{
    CompleterEvent, CompleterEventKind, CompleterEventSink, ExternalEvent, StageEvent, ThreadEvent,
};
pub use external::{create_external_completion, PendingCompletions};
pub use external_http::ExternalReceiver;
pub use graph::Graph;
pub use ids::{StageId, ThreadId};
pub use invoker::{FunctionInvoker, StageInvoker};
pub use node::Node;
pub use result::CResult;
pub use scheduler::{Executors, TokioExecutors};
