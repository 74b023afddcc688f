use crate::datum::Datum;
use crate::graph::Graph;
use crate::invoker::StageInvoker;
use crate::node::{spawn_node, Node};
use crate::result::CResult;
use crate::scheduler::Executors;
use futures::future::{self, BoxFuture};
use std::sync::Arc;

fn race_inputs(left: &Arc<Node>, right: &Arc<Node>) -> BoxFuture<'static, Vec<CResult>> {
    let left_output = left.output.clone();
    let right_output = right.output.clone();
    Box::pin(async move {
        let winner = future::select(Box::pin(left_output.get()), Box::pin(right_output.get())).await;
        let result = match winner {
            future::Either::Left((result, _losing)) => result,
            future::Either::Right((result, _losing)) => result,
        };
        vec![result]
    })
}

/// Shared race-then-invoke step behind `acceptEither`/`applyToEither`. The
/// losing branch's eventual result, success or failure, is discarded. If the
/// winner itself failed, that failure propagates without the closure ever
/// running. `keep_closure_result` is what tells the two combinators apart:
/// `applyToEither` surfaces the closure's return value, `acceptEither`
/// discards it to `Success(Empty)`.
fn race_then_invoke(
    graph: &Arc<Graph>,
    executors: &Arc<dyn Executors>,
    invoker: Arc<dyn StageInvoker>,
    left: &Arc<Node>,
    right: &Arc<Node>,
    closure: Datum,
    keep_closure_result: bool,
) -> Arc<Node> {
    let function_id = graph.function_id.clone();
    spawn_node(
        graph,
        executors,
        race_inputs(left, right),
        move |id, inputs, _graph| async move {
            match &inputs[0] {
                CResult::Failure(_) => inputs.into_iter().next().unwrap(),
                CResult::Success(_) => {
                    let result = invoker.invoke_stage(&function_id, id, closure, inputs).await;
                    if keep_closure_result || result.is_failure() {
                        result
                    } else {
                        CResult::Success(Datum::Empty)
                    }
                }
            }
        },
    )
}

/// `acceptEither(p, q, c)`: races two parents, runs the closure only on the
/// winner, and discards the closure's return value -- the node resolves to
/// `Success(Empty)` unless the winner failed or the closure itself failed.
pub fn accept_either(
    graph: &Arc<Graph>,
    executors: &Arc<dyn Executors>,
    invoker: Arc<dyn StageInvoker>,
    left: &Arc<Node>,
    right: &Arc<Node>,
    closure: Datum,
) -> Arc<Node> {
    race_then_invoke(graph, executors, invoker, left, right, closure, false)
}

/// `applyToEither(p, q, c)`: same race as `acceptEither`, but the node
/// resolves to whatever the closure returned.
pub fn apply_to_either(
    graph: &Arc<Graph>,
    executors: &Arc<dyn Executors>,
    invoker: Arc<dyn StageInvoker>,
    left: &Arc<Node>,
    right: &Arc<Node>,
    closure: Datum,
) -> Arc<Node> {
    race_then_invoke(graph, executors, invoker, left, right, closure, true)
}
