use thiserror::Error;

/// Construction-time failures for the HTTP-backed collaborators. Transport
/// failures once a call is in flight are folded into a `CResult` instead --
/// these only cover misconfiguration caught before a request is ever sent.
#[derive(Debug, Error)]
pub enum InvokerError {
    #[error("invalid stage runner URL: {0}")]
    InvalidStageRunnerUrl(String),
}
