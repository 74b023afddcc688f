use crate::datum::Datum;
use crate::graph::Graph;
use crate::node::{spawn_node, Node};
use crate::result::CResult;
use crate::scheduler::Executors;
use futures::future::{join_all, BoxFuture};
use std::sync::Arc;

/// `allOf(stages)`: waits for every listed stage. If every one succeeded the
/// node resolves to `Success(Empty)` -- the combinator carries no value of
/// its own. Otherwise the first failure in list order wins, matching the
/// argument order the caller registered the stages in.
pub fn all_of(
    graph: &Arc<Graph>,
    executors: &Arc<dyn Executors>,
    parents: Vec<Arc<Node>>,
) -> Arc<Node> {
    let input_fut: BoxFuture<'static, Vec<CResult>> = Box::pin(async move {
        join_all(parents.iter().map(|n| n.output.get())).await
    });
    spawn_node(graph, executors, input_fut, |_id, inputs, _graph| async move {
        match inputs.into_iter().find(|r| r.is_failure()) {
            Some(failure) => failure,
            None => CResult::Success(Datum::Empty),
        }
    })
}
