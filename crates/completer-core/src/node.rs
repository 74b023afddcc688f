//! The unit of computation in a graph.

use crate::cell::{output_cell, OutputFuture};
use crate::datum::ErrorKind;
use crate::graph::Graph;
use crate::ids::StageId;
use crate::result::CResult;
use crate::scheduler::Executors;
use futures::future::BoxFuture;
use std::sync::Arc;

pub struct Node {
    pub id: StageId,
    pub output: OutputFuture,
}

/// Wires a new node into `graph`: allocates its id, builds its output cell,
/// inserts it, and schedules the work that drives `input_fut` through
/// `invoke` to a resolved `CResult`. This is the single place a stage-task
/// panic or cancellation (a host bug) is translated into the graph's
/// failure vocabulary -- everywhere else a combinator only ever sees
/// `CResult`s.
pub(crate) fn spawn_node<F, Fut>(
    graph: &Arc<Graph>,
    executors: &Arc<dyn Executors>,
    input_fut: BoxFuture<'static, Vec<CResult>>,
    invoke: F,
) -> Arc<Node>
where
    F: FnOnce(StageId, Vec<CResult>, Arc<Graph>) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = CResult> + Send + 'static,
{
    let id = graph.new_node_id();
    let (resolver, output) = output_cell();
    let node = Arc::new(Node { id, output });
    graph.add_node(node.clone());

    let body_graph = graph.clone();
    let body: BoxFuture<'static, CResult> = Box::pin(async move {
        let inputs = input_fut.await;
        body_graph.mark_active();
        let result = invoke(id, inputs, body_graph.clone()).await;
        body_graph.mark_inactive();
        result
    });
    let handle = executors.spawn(body);

    tokio::spawn(async move {
        let result = match handle.await {
            Ok(result) => result,
            Err(join_err) => CResult::error(
                ErrorKind::UnknownError,
                format!("stage task did not complete: {join_err}"),
            ),
        };
        resolver.resolve(result);
    });

    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::Datum;
    use crate::scheduler::TokioExecutors;

    #[tokio::test(flavor = "multi_thread")]
    async fn spawn_node_resolves_output() {
        let graph = Arc::new(Graph::new("fn/test"));
        let executors: Arc<dyn Executors> = Arc::new(TokioExecutors);
        let node = spawn_node(
            &graph,
            &executors,
            Box::pin(async { Vec::new() }),
            |_id, _inputs, _graph| async { CResult::Success(Datum::Empty) },
        );
        assert_eq!(node.output.get().await, CResult::Success(Datum::Empty));
        assert_eq!(graph.node_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn spawn_node_translates_panic_into_unknown_error() {
        let graph = Arc::new(Graph::new("fn/test"));
        let executors: Arc<dyn Executors> = Arc::new(TokioExecutors);
        let node = spawn_node(
            &graph,
            &executors,
            Box::pin(async { Vec::new() }),
            |_id, _inputs, _graph| async {
                panic!("stage invoker exploded");
                #[allow(unreachable_code)]
                CResult::Success(Datum::Empty)
            },
        );
        let result = node.output.get().await;
        assert!(matches!(
            result,
            CResult::Failure(Datum::Error {
                kind: ErrorKind::UnknownError,
                ..
            })
        ));
    }
}
