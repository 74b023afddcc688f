use crate::datum::Datum;
use thiserror::Error;

/// Engine-internal bugs: façade entry points that could not locate what the
/// caller asked for, or infrastructure that failed to start. These are never
/// modeled as `Result`s on the graph.
#[derive(Debug, Error)]
pub enum CompleterError {
    #[error("unknown thread: {0}")]
    UnknownThread(String),
    #[error("unknown stage: {0}")]
    UnknownStage(String),
    #[error("invalid graph: {0}")]
    InvalidGraph(String),
    #[error("failed to bind external completion receiver: {0}")]
    BindFailed(String),
}

/// What `wait_for_completion` returns when the awaited stage did not
/// succeed. `CloudCompletion` carries the user-visible failure payload;
/// `Platform` covers the engine misbehaving at the façade boundary.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("stage completed with a failure: {0:?}")]
    CloudCompletion(Datum),
    #[error("platform error: {0}")]
    Platform(String),
}

impl From<CompleterError> for WaitError {
    fn from(err: CompleterError) -> Self {
        WaitError::Platform(err.to_string())
    }
}
