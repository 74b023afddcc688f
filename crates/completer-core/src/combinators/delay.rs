use crate::datum::Datum;
use crate::graph::Graph;
use crate::node::{spawn_node, Node};
use crate::result::CResult;
use crate::scheduler::Executors;
use std::sync::Arc;
use std::time::Duration;

/// `delay(duration)`: carries no input and no closure, just a timer. Always
/// succeeds with `Empty` once it fires.
pub fn delay(graph: &Arc<Graph>, executors: &Arc<dyn Executors>, duration: Duration) -> Arc<Node> {
    let sleep_executors = executors.clone();
    spawn_node(
        graph,
        executors,
        Box::pin(async { Vec::new() }),
        move |_id, _inputs, _graph| async move {
            sleep_executors.sleep(duration).await;
            CResult::Success(Datum::Empty)
        },
    )
}
