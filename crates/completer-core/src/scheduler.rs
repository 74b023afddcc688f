//! The two logical executors a completer runs on: an unbounded worker pool
//! for stage/function invocations, and a single-shot timer for delay
//! stages. Abstracted behind a trait so tests can substitute a
//! deterministic scheduler instead of real wall-clock time.

use crate::result::CResult;
use futures::future::BoxFuture;
use std::time::Duration;
use tokio::task::JoinHandle;

pub trait Executors: Send + Sync {
    /// Runs `fut` on the worker pool, returning a handle whose `Err` means
    /// the task panicked or was cancelled -- a host bug, not a graph failure.
    fn spawn(&self, fut: BoxFuture<'static, CResult>) -> JoinHandle<CResult>;

    /// A future that resolves after `duration`, driven by the timer.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioExecutors;

impl Executors for TokioExecutors {
    fn spawn(&self, fut: BoxFuture<'static, CResult>) -> JoinHandle<CResult> {
        tokio::spawn(fut)
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
