use super::empty_input;
use crate::datum::Datum;
use crate::graph::Graph;
use crate::invoker::StageInvoker;
use crate::node::{spawn_node, Node};
use crate::result::CResult;
use crate::scheduler::Executors;
use std::sync::Arc;

/// `supply(closure)`: empty input, invokes the closure with no inputs.
/// Never catches; a transport failure from the invoker passes through as-is.
pub fn supply(
    graph: &Arc<Graph>,
    executors: &Arc<dyn Executors>,
    invoker: Arc<dyn StageInvoker>,
    closure: Datum,
) -> Arc<Node> {
    let function_id = graph.function_id.clone();
    spawn_node(
        graph,
        executors,
        empty_input(),
        move |id, inputs, _graph| async move {
            invoker.invoke_stage(&function_id, id, closure, inputs).await
        },
    )
}

/// `completedValue(v)`: resolves immediately with the already-serialized
/// value, never fails.
pub fn completed_value(
    graph: &Arc<Graph>,
    executors: &Arc<dyn Executors>,
    value: Datum,
) -> Arc<Node> {
    spawn_node(graph, executors, empty_input(), move |_id, _inputs, _graph| async move {
        CResult::Success(value)
    })
}
