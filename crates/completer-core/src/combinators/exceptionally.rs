use super::single_parent_input;
use crate::datum::Datum;
use crate::graph::Graph;
use crate::invoker::StageInvoker;
use crate::node::{spawn_node, Node};
use crate::result::CResult;
use crate::scheduler::Executors;
use std::sync::Arc;

/// `exceptionally(closure)`: a success passes straight through untouched and
/// the closure is never invoked; a failure is handed to the closure, whose
/// result becomes this node's result, success or failure alike.
pub fn exceptionally(
    graph: &Arc<Graph>,
    executors: &Arc<dyn Executors>,
    invoker: Arc<dyn StageInvoker>,
    parent: &Arc<Node>,
    closure: Datum,
) -> Arc<Node> {
    let function_id = graph.function_id.clone();
    spawn_node(
        graph,
        executors,
        single_parent_input(parent),
        move |id, inputs, _graph| async move {
            match &inputs[0] {
                CResult::Success(_) => inputs.into_iter().next().unwrap(),
                CResult::Failure(_) => invoker.invoke_stage(&function_id, id, closure, inputs).await,
            }
        },
    )
}
