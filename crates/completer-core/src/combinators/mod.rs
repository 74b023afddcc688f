//! One module per combinator family. Each constructs a fresh node: how its
//! input future is assembled from parents, what its invoke step computes,
//! and the failure rule it follows.

pub mod all_of;
pub mod any_of;
pub mod apply;
pub mod combine;
pub mod compose;
pub mod delay;
pub mod either;
pub mod exceptionally;
pub mod invoke_function;
pub mod supply;
pub mod when_complete;

use crate::node::Node;
use crate::result::CResult;
use futures::future::BoxFuture;
use std::sync::Arc;

pub(crate) fn empty_input() -> BoxFuture<'static, Vec<CResult>> {
    Box::pin(async { Vec::new() })
}

pub(crate) fn single_parent_input(parent: &Arc<Node>) -> BoxFuture<'static, Vec<CResult>> {
    let output = parent.output.clone();
    Box::pin(async move { vec![output.get().await] })
}

pub(crate) fn two_parent_input(p: &Arc<Node>, q: &Arc<Node>) -> BoxFuture<'static, Vec<CResult>> {
    let po = p.output.clone();
    let qo = q.output.clone();
    Box::pin(async move {
        let (pr, qr) = tokio::join!(po.get(), qo.get());
        vec![pr, qr]
    })
}

/// The two-slot shape `whenComplete`/`handle` closures see: on success,
/// `[parentResult, Success(Empty)]`; on failure, `[Success(Empty),
/// Failure(parentError)]`. Lets the closure inspect both positions.
pub(crate) fn two_slot_input(parent: &Arc<Node>) -> BoxFuture<'static, Vec<CResult>> {
    let output = parent.output.clone();
    Box::pin(async move {
        use crate::datum::Datum;
        match output.get().await {
            success @ CResult::Success(_) => vec![success, CResult::Success(Datum::Empty)],
            failure @ CResult::Failure(_) => vec![CResult::Success(Datum::Empty), failure],
        }
    })
}
