//! The façade a caller actually drives: create threads, register stages by
//! composing the combinator functions over previously registered stage
//! ids, commit, and block on a chosen stage's outcome.

use crate::combinators;
use crate::config::CompleterConfig;
use crate::datum::{Datum, Headers, HttpMethod};
use crate::errors::{CompleterError, WaitError};
use crate::events::{
    CompleterEventKind, CompleterEventSink, ExternalEvent, StageEvent, ThreadEvent,
};
use crate::external::{self, PendingCompletions};
use crate::external_http::ExternalReceiver;
use crate::graph::Graph;
use crate::ids::{StageId, ThreadId};
use crate::invoker::{FunctionInvoker, StageInvoker};
use crate::node::Node;
use crate::result::CResult;
use crate::scheduler::Executors;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

pub struct Completer {
    graphs: RwLock<HashMap<String, Arc<Graph>>>,
    thread_counter: AtomicU64,
    executors: Arc<dyn Executors>,
    stage_invoker: Arc<dyn StageInvoker>,
    function_invoker: Arc<dyn FunctionInvoker>,
    external: ExternalReceiver,
    events: CompleterEventSink,
    config: CompleterConfig,
}

impl Completer {
    pub fn new(
        config: CompleterConfig,
        executors: Arc<dyn Executors>,
        stage_invoker: Arc<dyn StageInvoker>,
        function_invoker: Arc<dyn FunctionInvoker>,
        events: CompleterEventSink,
    ) -> Self {
        let pending = Arc::new(PendingCompletions::new());
        let external = ExternalReceiver::new(config.clone(), pending, events.clone());
        Self {
            graphs: RwLock::new(HashMap::new()),
            thread_counter: AtomicU64::new(0),
            executors,
            stage_invoker,
            function_invoker,
            external,
            events,
            config,
        }
    }

    pub fn config(&self) -> &CompleterConfig {
        &self.config
    }

    pub fn events(&self) -> &CompleterEventSink {
        &self.events
    }

    pub async fn start_external_receiver(&self) -> Result<(), CompleterError> {
        self.external.start().await
    }

    pub fn stop_external_receiver(&self) {
        self.external.stop();
    }

    /// The socket the external receiver actually bound, once started --
    /// useful in tests that bind port 0 and let the OS pick one.
    pub fn external_bound_addr(&self) -> Option<std::net::SocketAddr> {
        self.external.bound_addr()
    }

    pub fn create_thread(&self, function_id: impl Into<String>) -> ThreadId {
        let n = self.thread_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let thread_id = ThreadId::from_counter(n);
        let function_id = function_id.into();
        let graph = Arc::new(Graph::new(function_id.clone()));
        self.graphs
            .write()
            .expect("graph table lock poisoned")
            .insert(thread_id.as_str().to_string(), graph);
        self.events.emit(CompleterEventKind::Thread(ThreadEvent::Created {
            thread_id: thread_id.to_string(),
            function_id,
        }));
        thread_id
    }

    pub fn commit(&self, thread_id: &ThreadId) -> Result<(), CompleterError> {
        let graph = self.graph(thread_id)?;
        graph.commit();
        self.events
            .emit(CompleterEventKind::Thread(ThreadEvent::Committed {
                thread_id: thread_id.to_string(),
            }));
        Ok(())
    }

    pub async fn wait_for_completion(
        &self,
        thread_id: &ThreadId,
        stage_id: StageId,
    ) -> Result<Datum, WaitError> {
        let graph = self.graph(thread_id)?;
        let output = graph.with_node(stage_id, |node| node.output.clone())?;
        match output.get().await {
            CResult::Success(datum) => Ok(datum),
            CResult::Failure(datum) => Err(WaitError::CloudCompletion(datum)),
        }
    }

    pub fn completed_value(&self, thread_id: &ThreadId, value: Datum) -> Result<Arc<Node>, CompleterError> {
        let graph = self.graph(thread_id)?;
        let node = combinators::supply::completed_value(&graph, &self.executors, value);
        self.track(thread_id, &node, "completedValue");
        Ok(node)
    }

    pub fn supply(&self, thread_id: &ThreadId, closure: Datum) -> Result<Arc<Node>, CompleterError> {
        let graph = self.graph(thread_id)?;
        let node = combinators::supply::supply(&graph, &self.executors, self.stage_invoker.clone(), closure);
        self.track(thread_id, &node, "supply");
        Ok(node)
    }

    pub fn then_apply(
        &self,
        thread_id: &ThreadId,
        parent: StageId,
        closure: Datum,
    ) -> Result<Arc<Node>, CompleterError> {
        let graph = self.graph(thread_id)?;
        let parent = graph.with_node(parent, Arc::clone)?;
        let node = combinators::apply::then_apply(&graph, &self.executors, self.stage_invoker.clone(), &parent, closure);
        self.track(thread_id, &node, "thenApply");
        Ok(node)
    }

    /// `thenAccept`/`thenRun` share `thenApply`'s engine-level resolution
    /// rule; the distinction is purely in the closure's arity and return
    /// type, which the engine never inspects.
    pub fn then_accept(
        &self,
        thread_id: &ThreadId,
        parent: StageId,
        closure: Datum,
    ) -> Result<Arc<Node>, CompleterError> {
        self.then_apply(thread_id, parent, closure)
    }

    pub fn then_run(
        &self,
        thread_id: &ThreadId,
        parent: StageId,
        closure: Datum,
    ) -> Result<Arc<Node>, CompleterError> {
        self.then_apply(thread_id, parent, closure)
    }

    pub fn then_compose(
        &self,
        thread_id: &ThreadId,
        parent: StageId,
        closure: Datum,
    ) -> Result<Arc<Node>, CompleterError> {
        let graph = self.graph(thread_id)?;
        let parent = graph.with_node(parent, Arc::clone)?;
        let node = combinators::compose::then_compose(&graph, &self.executors, self.stage_invoker.clone(), &parent, closure);
        self.track(thread_id, &node, "thenCompose");
        Ok(node)
    }

    pub fn then_combine(
        &self,
        thread_id: &ThreadId,
        left: StageId,
        right: StageId,
        closure: Datum,
    ) -> Result<Arc<Node>, CompleterError> {
        let graph = self.graph(thread_id)?;
        let (left, right) = graph.with_nodes(&[left, right], |nodes| (nodes[0].clone(), nodes[1].clone()))?;
        let node = combinators::combine::then_combine(&graph, &self.executors, self.stage_invoker.clone(), &left, &right, closure);
        self.track(thread_id, &node, "thenCombine");
        Ok(node)
    }

    /// `thenAcceptBoth` shares `thenCombine`'s join-then-invoke rule.
    pub fn then_accept_both(
        &self,
        thread_id: &ThreadId,
        left: StageId,
        right: StageId,
        closure: Datum,
    ) -> Result<Arc<Node>, CompleterError> {
        self.then_combine(thread_id, left, right, closure)
    }

    pub fn when_complete(
        &self,
        thread_id: &ThreadId,
        parent: StageId,
        closure: Datum,
    ) -> Result<Arc<Node>, CompleterError> {
        let graph = self.graph(thread_id)?;
        let parent = graph.with_node(parent, Arc::clone)?;
        let node = combinators::when_complete::when_complete(&graph, &self.executors, self.stage_invoker.clone(), &parent, closure);
        self.track(thread_id, &node, "whenComplete");
        Ok(node)
    }

    pub fn handle(
        &self,
        thread_id: &ThreadId,
        parent: StageId,
        closure: Datum,
    ) -> Result<Arc<Node>, CompleterError> {
        let graph = self.graph(thread_id)?;
        let parent = graph.with_node(parent, Arc::clone)?;
        let node = combinators::when_complete::handle(&graph, &self.executors, self.stage_invoker.clone(), &parent, closure);
        self.track(thread_id, &node, "handle");
        Ok(node)
    }

    pub fn exceptionally(
        &self,
        thread_id: &ThreadId,
        parent: StageId,
        closure: Datum,
    ) -> Result<Arc<Node>, CompleterError> {
        let graph = self.graph(thread_id)?;
        let parent = graph.with_node(parent, Arc::clone)?;
        let node = combinators::exceptionally::exceptionally(&graph, &self.executors, self.stage_invoker.clone(), &parent, closure);
        self.track(thread_id, &node, "exceptionally");
        Ok(node)
    }

    pub fn accept_either(
        &self,
        thread_id: &ThreadId,
        left: StageId,
        right: StageId,
        closure: Datum,
    ) -> Result<Arc<Node>, CompleterError> {
        let graph = self.graph(thread_id)?;
        let (left, right) = graph.with_nodes(&[left, right], |nodes| (nodes[0].clone(), nodes[1].clone()))?;
        let node = combinators::either::accept_either(&graph, &self.executors, self.stage_invoker.clone(), &left, &right, closure);
        self.track(thread_id, &node, "acceptEither");
        Ok(node)
    }

    /// `applyToEither` races the same way `acceptEither` does, but keeps the
    /// winning closure's return value instead of discarding it.
    pub fn apply_to_either(
        &self,
        thread_id: &ThreadId,
        left: StageId,
        right: StageId,
        closure: Datum,
    ) -> Result<Arc<Node>, CompleterError> {
        let graph = self.graph(thread_id)?;
        let (left, right) = graph.with_nodes(&[left, right], |nodes| (nodes[0].clone(), nodes[1].clone()))?;
        let node = combinators::either::apply_to_either(&graph, &self.executors, self.stage_invoker.clone(), &left, &right, closure);
        self.track(thread_id, &node, "applyToEither");
        Ok(node)
    }

    pub fn all_of(&self, thread_id: &ThreadId, stages: &[StageId]) -> Result<Arc<Node>, CompleterError> {
        let graph = self.graph(thread_id)?;
        let parents = graph.with_nodes(stages, |nodes| nodes.to_vec())?;
        let node = combinators::all_of::all_of(&graph, &self.executors, parents);
        self.track(thread_id, &node, "allOf");
        Ok(node)
    }

    pub fn any_of(&self, thread_id: &ThreadId, stages: &[StageId]) -> Result<Arc<Node>, CompleterError> {
        if stages.is_empty() {
            return Err(CompleterError::InvalidGraph(
                "anyOf requires at least one stage".to_string(),
            ));
        }
        let graph = self.graph(thread_id)?;
        let parents = graph.with_nodes(stages, |nodes| nodes.to_vec())?;
        let node = combinators::any_of::any_of(&graph, &self.executors, parents);
        self.track(thread_id, &node, "anyOf");
        Ok(node)
    }

    pub fn delay(&self, thread_id: &ThreadId, duration: Duration) -> Result<Arc<Node>, CompleterError> {
        let graph = self.graph(thread_id)?;
        let node = combinators::delay::delay(&graph, &self.executors, duration);
        self.track(thread_id, &node, "delay");
        Ok(node)
    }

    pub fn invoke_function(
        &self,
        thread_id: &ThreadId,
        target_function_id: impl Into<String>,
        method: HttpMethod,
        headers: Headers,
        body: Vec<u8>,
    ) -> Result<Arc<Node>, CompleterError> {
        let graph = self.graph(thread_id)?;
        let node = combinators::invoke_function::invoke_function(
            &graph,
            &self.executors,
            self.function_invoker.clone(),
            target_function_id.into(),
            method,
            headers,
            body,
        );
        self.track(thread_id, &node, "invokeFunction");
        Ok(node)
    }

    pub fn create_external_completion(&self, thread_id: &ThreadId) -> Result<Arc<Node>, CompleterError> {
        let graph = self.graph(thread_id)?;
        let node = external::create_external_completion(&graph, thread_id, self.external.pending());
        self.events.emit(CompleterEventKind::External(ExternalEvent::Registered {
            thread_id: thread_id.to_string(),
            stage_id: node.id.to_string(),
            path: format!("{}/{}_{}", self.config.normalized_prefix(), thread_id, node.id),
        }));
        self.track(thread_id, &node, "createExternalCompletion");
        Ok(node)
    }

    /// Resolves a pending external completion without going through HTTP --
    /// useful for in-process callers and tests.
    pub fn complete_external(
        &self,
        thread_id: &ThreadId,
        stage_id: StageId,
        value: Datum,
    ) -> Result<(), CompleterError> {
        self.resolve_external(thread_id, stage_id, CResult::Success(value))
    }

    pub fn fail_external(
        &self,
        thread_id: &ThreadId,
        stage_id: StageId,
        value: Datum,
    ) -> Result<(), CompleterError> {
        self.resolve_external(thread_id, stage_id, CResult::Failure(value))
    }

    fn resolve_external(&self, thread_id: &ThreadId, stage_id: StageId, result: CResult) -> Result<(), CompleterError> {
        let entry = self
            .external
            .pending()
            .take(thread_id.as_str(), &stage_id.to_string())
            .ok_or_else(|| CompleterError::UnknownStage(stage_id.to_string()))?;
        external::complete(entry, result);
        Ok(())
    }

    fn graph(&self, thread_id: &ThreadId) -> Result<Arc<Graph>, CompleterError> {
        self.graphs
            .read()
            .expect("graph table lock poisoned")
            .get(thread_id.as_str())
            .cloned()
            .ok_or_else(|| CompleterError::UnknownThread(thread_id.to_string()))
    }

    /// Every registered stage gets a `Registered` event immediately and, if
    /// any observer is attached, a background watcher that emits `Resolved`
    /// once the stage settles.
    fn track(&self, thread_id: &ThreadId, node: &Arc<Node>, combinator: &'static str) {
        self.events.emit(CompleterEventKind::Stage(StageEvent::Registered {
            thread_id: thread_id.to_string(),
            stage_id: node.id.to_string(),
            combinator: combinator.to_string(),
        }));
        if self.events.is_enabled() {
            let events = self.events.clone();
            let thread_id = thread_id.to_string();
            let stage_id = node.id.to_string();
            let output = node.output.clone();
            tokio::spawn(async move {
                let result = output.get().await;
                events.emit(CompleterEventKind::Stage(StageEvent::Resolved {
                    thread_id,
                    stage_id,
                    success: result.is_success(),
                }));
            });
        }
    }
}
