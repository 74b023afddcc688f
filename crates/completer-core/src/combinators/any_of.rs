use crate::graph::Graph;
use crate::node::{spawn_node, Node};
use crate::result::CResult;
use crate::scheduler::Executors;
use futures::future::{select_all, BoxFuture};
use std::sync::Arc;

/// `anyOf(stages)`: resolves to whichever listed stage settles first,
/// success or failure, unchanged. The caller is responsible for rejecting
/// an empty list at registration time -- this combinator assumes at least
/// one parent and would otherwise wait forever.
pub fn any_of(
    graph: &Arc<Graph>,
    executors: &Arc<dyn Executors>,
    parents: Vec<Arc<Node>>,
) -> Arc<Node> {
    let input_fut: BoxFuture<'static, Vec<CResult>> = Box::pin(async move {
        let futures: Vec<_> = parents.iter().map(|n| Box::pin(n.output.get())).collect();
        let (result, _index, _rest) = select_all(futures).await;
        vec![result]
    });
    spawn_node(graph, executors, input_fut, |_id, mut inputs, _graph| async move {
        inputs.pop().expect("any_of always produces exactly one input")
    })
}
