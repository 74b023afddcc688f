use super::single_parent_input;
use crate::datum::Datum;
use crate::graph::Graph;
use crate::invoker::StageInvoker;
use crate::node::{spawn_node, Node};
use crate::result::CResult;
use crate::scheduler::Executors;
use std::sync::Arc;

/// `thenApply`/`thenAccept`/`thenRun` share one resolution rule: the
/// closure's arity and return convention are opaque to the engine (the
/// stage invoker always hands back a single `CResult` regardless), so all
/// three reduce to the same wiring -- propagate the parent's failure
/// untouched, otherwise invoke the closure on the parent's success.
pub fn then_apply(
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
                CResult::Failure(_) => inputs.into_iter().next().unwrap(),
                CResult::Success(_) => invoker.invoke_stage(&function_id, id, closure, inputs).await,
            }
        },
    )
}
