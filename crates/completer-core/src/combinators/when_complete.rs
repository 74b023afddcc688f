use super::two_slot_input;
use crate::datum::Datum;
use crate::graph::Graph;
use crate::invoker::StageInvoker;
use crate::node::{spawn_node, Node};
use crate::result::CResult;
use crate::scheduler::Executors;
use std::sync::Arc;

/// Recovers the parent's untouched result from the two-slot shape
/// `two_slot_input` produces: slot 1 is the failure marker, so its presence
/// (not its content, since a real `Failure(Datum::Empty)` and the filler
/// `Success(Datum::Empty)` both carry `Empty`) is what tells the two cases
/// apart.
fn original_result(slots: &[CResult]) -> CResult {
    if slots[1].is_failure() {
        slots[1].clone()
    } else {
        slots[0].clone()
    }
}

/// `whenComplete(closure)`: invokes the closure with both slots filled in
/// for inspection, but its return value -- success or failure alike -- is
/// discarded. The node always resolves to the parent's own result, even if
/// invoking the closure itself failed.
pub fn when_complete(
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
        two_slot_input(parent),
        move |id, inputs, _graph| async move {
            let original = original_result(&inputs);
            let _ = invoker.invoke_stage(&function_id, id, closure, inputs).await;
            original
        },
    )
}

/// `handle(closure)`: like `whenComplete`, but the closure's return value
/// always becomes the node's result, whether the parent succeeded or
/// failed -- this is the recovery combinator.
pub fn handle(
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
        two_slot_input(parent),
        move |id, inputs, _graph| async move {
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

    struct RecordingInvoker {
        saw_failure_slot: std::sync::Arc<std::sync::atomic::AtomicBool>,
    }

    #[async_trait::async_trait]
    impl StageInvoker for RecordingInvoker {
        async fn invoke_stage(
            &self,
            _function_id: &str,
            _stage_id: StageId,
            _closure: Datum,
            inputs: Vec<CResult>,
        ) -> CResult {
            if inputs[1].is_failure() {
                self.saw_failure_slot.store(true, std::sync::atomic::Ordering::SeqCst);
            }
            CResult::Success(Datum::Empty)
        }
    }

    struct RecoverWithFixed(Datum);

    #[async_trait::async_trait]
    impl StageInvoker for RecoverWithFixed {
        async fn invoke_stage(
            &self,
            _function_id: &str,
            _stage_id: StageId,
            _closure: Datum,
            _inputs: Vec<CResult>,
        ) -> CResult {
            CResult::Success(self.0.clone())
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn when_complete_preserves_parent_success_and_sees_both_slots() {
        let graph = Arc::new(Graph::new("fn/test"));
        let executors: Arc<dyn Executors> = Arc::new(TokioExecutors);
        let saw_failure_slot = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));

        let parent = completed_value(&graph, &executors, Datum::blob("text/plain", b"ok".to_vec()));
        let observed = when_complete(
            &graph,
            &executors,
            Arc::new(RecordingInvoker { saw_failure_slot: saw_failure_slot.clone() }),
            &parent,
            Datum::Empty,
        );

        assert_eq!(
            observed.output.get().await,
            CResult::Success(Datum::blob("text/plain", b"ok".to_vec()))
        );
        assert!(!saw_failure_slot.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn when_complete_preserves_parent_failure() {
        let graph = Arc::new(Graph::new("fn/test"));
        let executors: Arc<dyn Executors> = Arc::new(TokioExecutors);

        let parent = spawn_node(
            &graph,
            &executors,
            Box::pin(async { Vec::new() }),
            |_id, _inputs, _graph| async { CResult::error(ErrorKind::UnknownError, "boom") },
        );
        let observed = when_complete(
            &graph,
            &executors,
            Arc::new(RecoverWithFixed(Datum::Empty)),
            &parent,
            Datum::Empty,
        );

        assert_eq!(observed.output.get().await, CResult::error(ErrorKind::UnknownError, "boom"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn when_complete_discards_a_failure_in_the_closure_itself() {
        let graph = Arc::new(Graph::new("fn/test"));
        let executors: Arc<dyn Executors> = Arc::new(TokioExecutors);

        struct AlwaysFailingInvoker;
        #[async_trait::async_trait]
        impl StageInvoker for AlwaysFailingInvoker {
            async fn invoke_stage(
                &self,
                _function_id: &str,
                _stage_id: StageId,
                _closure: Datum,
                _inputs: Vec<CResult>,
            ) -> CResult {
                CResult::error(ErrorKind::StageInvokeFailed, "closure blew up")
            }
        }

        let parent = completed_value(&graph, &executors, Datum::blob("text/plain", b"ok".to_vec()));
        let observed = when_complete(&graph, &executors, Arc::new(AlwaysFailingInvoker), &parent, Datum::Empty);

        assert_eq!(
            observed.output.get().await,
            CResult::Success(Datum::blob("text/plain", b"ok".to_vec()))
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn handle_recovers_a_failed_parent() {
        let graph = Arc::new(Graph::new("fn/test"));
        let executors: Arc<dyn Executors> = Arc::new(TokioExecutors);

        let parent = spawn_node(
            &graph,
            &executors,
            Box::pin(async { Vec::new() }),
            |_id, _inputs, _graph| async { CResult::error(ErrorKind::UnknownError, "boom") },
        );
        let recovered = handle(
            &graph,
            &executors,
            Arc::new(RecoverWithFixed(Datum::blob("text/plain", b"fallback".to_vec()))),
            &parent,
            Datum::Empty,
        );

        assert_eq!(
            recovered.output.get().await,
            CResult::Success(Datum::blob("text/plain", b"fallback".to_vec()))
        );
    }
}
