//! A one-shot, multi-observer asynchronous cell: the concrete shape of a
//! node's output future. Resolves at most once (enforced by `resolve`
//! consuming the resolver), observable by any number of clones.

use crate::datum::ErrorKind;
use crate::result::CResult;
use tokio::sync::watch;

#[derive(Clone)]
pub struct OutputFuture {
    rx: watch::Receiver<Option<CResult>>,
}

pub struct OutputResolver {
    tx: watch::Sender<Option<CResult>>,
}

pub fn output_cell() -> (OutputResolver, OutputFuture) {
    let (tx, rx) = watch::channel(None);
    (OutputResolver { tx }, OutputFuture { rx })
}

impl OutputResolver {
    /// Resolves the cell exactly once. Consuming `self` makes a second
    /// resolution a compile error rather than a runtime race.
    pub fn resolve(self, result: CResult) {
        let _ = self.tx.send(Some(result));
    }
}

impl OutputFuture {
    /// Awaits resolution, returning the same `CResult` to every caller.
    /// If the resolver was dropped without resolving (a bug, not a graph
    /// failure), this is the one place that translates it into a Result.
    pub async fn get(&self) -> CResult {
        let mut rx = self.rx.clone();
        loop {
            if let Some(result) = rx.borrow().clone() {
                return result;
            }
            if rx.changed().await.is_err() {
                return CResult::error(
                    ErrorKind::UnknownError,
                    "resolver dropped without completing",
                );
            }
        }
    }

    pub fn peek(&self) -> Option<CResult> {
        self.rx.borrow().clone()
    }
}
