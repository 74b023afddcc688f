use super::single_parent_input;
use crate::datum::{Datum, ErrorKind};
use crate::graph::Graph;
use crate::ids::StageId;
use crate::invoker::StageInvoker;
use crate::node::{spawn_node, Node};
use crate::result::CResult;
use crate::scheduler::Executors;
use std::sync::Arc;

/// `thenCompose(closure)`: the closure returns a reference to another stage
/// in the same graph rather than a value, and this node's result is whatever
/// that referenced stage eventually resolves to. A closure result that isn't
/// a stage reference, or one that names a stage this graph doesn't have, is
/// an `invalid_stage_response` failure rather than a panic.
pub fn then_compose(
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
        move |id, inputs, graph| async move {
            if inputs[0].is_failure() {
                return inputs.into_iter().next().unwrap();
            }
            let composed = invoker.invoke_stage(&function_id, id, closure, inputs).await;
            let CResult::Success(datum) = composed else {
                return composed;
            };
            let Some(raw_stage_id) = datum.as_stage_ref() else {
                return CResult::error(
                    ErrorKind::InvalidStageResponse,
                    "thenCompose closure did not return a stage reference",
                );
            };
            let Some(referenced) = StageId::parse(raw_stage_id) else {
                return CResult::error(
                    ErrorKind::InvalidStageResponse,
                    format!("thenCompose returned a malformed stage id: {raw_stage_id}"),
                );
            };
            match graph.with_node(referenced, |node| node.output.clone()) {
                Ok(output) => output.get().await,
                Err(_) => CResult::error(
                    ErrorKind::InvalidStageResponse,
                    format!("thenCompose referenced unknown stage {referenced}"),
                ),
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::supply::completed_value;
    use crate::scheduler::TokioExecutors;

    struct ComposeToStage(StageId);

    #[async_trait::async_trait]
    impl StageInvoker for ComposeToStage {
        async fn invoke_stage(
            &self,
            _function_id: &str,
            _stage_id: StageId,
            _closure: Datum,
            _inputs: Vec<CResult>,
        ) -> CResult {
            CResult::Success(Datum::stage_ref(self.0.to_string()))
        }
    }

    struct ReturnsGarbage;

    #[async_trait::async_trait]
    impl StageInvoker for ReturnsGarbage {
        async fn invoke_stage(
            &self,
            _function_id: &str,
            _stage_id: StageId,
            _closure: Datum,
            _inputs: Vec<CResult>,
        ) -> CResult {
            CResult::Success(Datum::Empty)
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn then_compose_resolves_to_referenced_stage_output() {
        let graph = Arc::new(Graph::new("fn/test"));
        let executors: Arc<dyn Executors> = Arc::new(TokioExecutors);

        let parent = completed_value(&graph, &executors, Datum::Empty);
        let target = completed_value(&graph, &executors, Datum::blob("text/plain", b"target".to_vec()));
        let composed = then_compose(
            &graph,
            &executors,
            Arc::new(ComposeToStage(target.id)),
            &parent,
            Datum::Empty,
        );

        assert_eq!(
            composed.output.get().await,
            CResult::Success(Datum::blob("text/plain", b"target".to_vec()))
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn then_compose_rejects_non_stage_ref_as_invalid_stage_response() {
        let graph = Arc::new(Graph::new("fn/test"));
        let executors: Arc<dyn Executors> = Arc::new(TokioExecutors);

        let parent = completed_value(&graph, &executors, Datum::Empty);
        let composed = then_compose(&graph, &executors, Arc::new(ReturnsGarbage), &parent, Datum::Empty);

        assert_eq!(
            composed.output.get().await.datum().as_error_kind(),
            Some(ErrorKind::InvalidStageResponse)
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn then_compose_rejects_unknown_stage_id_as_invalid_stage_response() {
        let graph = Arc::new(Graph::new("fn/test"));
        let executors: Arc<dyn Executors> = Arc::new(TokioExecutors);

        let parent = completed_value(&graph, &executors, Datum::Empty);
        let composed = then_compose(
            &graph,
            &executors,
            Arc::new(ComposeToStage(StageId::parse("999").unwrap())),
            &parent,
            Datum::Empty,
        );

        assert_eq!(
            composed.output.get().await.datum().as_error_kind(),
            Some(ErrorKind::InvalidStageResponse)
        );
    }
}
