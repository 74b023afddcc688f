use super::empty_input;
use crate::datum::{Headers, HttpMethod};
use crate::graph::Graph;
use crate::invoker::FunctionInvoker;
use crate::node::{spawn_node, Node};
use crate::scheduler::Executors;
use std::sync::Arc;

/// `invokeFunction(functionId, req)`: a root node with no graph-internal
/// parent. Delegates the actual HTTP call to the target function entirely
/// to the collaborator; this combinator only wires the call into the graph.
pub fn invoke_function(
    graph: &Arc<Graph>,
    executors: &Arc<dyn Executors>,
    invoker: Arc<dyn FunctionInvoker>,
    target_function_id: String,
    method: HttpMethod,
    headers: Headers,
    body: Vec<u8>,
) -> Arc<Node> {
    spawn_node(graph, executors, empty_input(), move |_id, _inputs, _graph| async move {
        invoker
            .invoke_function(&target_function_id, method, headers, body)
            .await
    })
}
