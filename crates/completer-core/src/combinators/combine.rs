use super::two_parent_input;
use crate::datum::Datum;
use crate::graph::Graph;
use crate::invoker::StageInvoker;
use crate::node::{spawn_node, Node};
use crate::result::CResult;
use crate::scheduler::Executors;
use std::sync::Arc;

/// `thenCombine`/`thenAcceptBoth` join two parents and invoke the closure
/// with both results once both have resolved. If either failed, the first
/// one in parent-argument order wins and the closure is never invoked.
pub fn then_combine(
    graph: &Arc<Graph>,
    executors: &Arc<dyn Executors>,
    invoker: Arc<dyn StageInvoker>,
    left: &Arc<Node>,
    right: &Arc<Node>,
    closure: Datum,
) -> Arc<Node> {
    let function_id = graph.function_id.clone();
    spawn_node(
        graph,
        executors,
        two_parent_input(left, right),
        move |id, inputs, _graph| async move {
            if let Some(failure) = inputs.iter().find(|r| r.is_failure()) {
                return failure.clone();
            }
            invoker.invoke_stage(&function_id, id, closure, inputs).await
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::supply::completed_value;
    use crate::datum::ErrorKind;
    use crate::ids::StageId;
    use crate::scheduler::TokioExecutors;

    struct ConcatInvoker;

    #[async_trait::async_trait]
    impl StageInvoker for ConcatInvoker {
        async fn invoke_stage(
            &self,
            _function_id: &str,
            _stage_id: StageId,
            _closure: Datum,
            inputs: Vec<CResult>,
        ) -> CResult {
            let Datum::Blob { bytes: left, .. } = inputs[0].datum() else {
                panic!("expected left blob")
            };
            let Datum::Blob { bytes: right, .. } = inputs[1].datum() else {
                panic!("expected right blob")
            };
            let mut combined = left.clone();
            combined.extend_from_slice(right);
            CResult::Success(Datum::blob("text/plain", combined))
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn then_combine_joins_both_parent_results() {
        let graph = Arc::new(Graph::new("fn/test"));
        let executors: Arc<dyn Executors> = Arc::new(TokioExecutors);

        let left = completed_value(&graph, &executors, Datum::blob("text/plain", b"left".to_vec()));
        let right = completed_value(&graph, &executors, Datum::blob("text/plain", b"right".to_vec()));
        let combined = then_combine(&graph, &executors, Arc::new(ConcatInvoker), &left, &right, Datum::Empty);

        assert_eq!(
            combined.output.get().await,
            CResult::Success(Datum::blob("text/plain", b"leftright".to_vec()))
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn then_combine_propagates_left_failure_over_right() {
        let graph = Arc::new(Graph::new("fn/test"));
        let executors: Arc<dyn Executors> = Arc::new(TokioExecutors);

        let left = spawn_node(
            &graph,
            &executors,
            Box::pin(async { Vec::new() }),
            |_id, _inputs, _graph| async { CResult::error(ErrorKind::UnknownError, "left failed") },
        );
        let right = completed_value(&graph, &executors, Datum::blob("text/plain", b"right".to_vec()));
        let combined = then_combine(&graph, &executors, Arc::new(ConcatInvoker), &left, &right, Datum::Empty);

        assert_eq!(combined.output.get().await, CResult::error(ErrorKind::UnknownError, "left failed"));
    }
}
