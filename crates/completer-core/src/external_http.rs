//! HTTP front door for external completions: one POST route accepting a
//! `{threadId}_{stageId}` correlation id and a `complete`/`fail` action,
//! wired up the way the pack's axum services build their routers.

use crate::config::CompleterConfig;
use crate::errors::CompleterError;
use crate::events::{CompleterEventKind, CompleterEventSink, ExternalEvent};
use crate::external::{self, PendingCompletions};
use crate::datum::{Datum, Headers, HttpMethod};
use crate::result::CResult;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::post;
use axum::Router;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

struct ReceiverState {
    pending: Arc<PendingCompletions>,
    events: CompleterEventSink,
}

/// Owns the receiver's bound socket and accept loop. `start` is idempotent;
/// `stop` aborts the accept task without waiting on in-flight requests.
pub struct ExternalReceiver {
    config: CompleterConfig,
    pending: Arc<PendingCompletions>,
    events: CompleterEventSink,
    handle: Mutex<Option<JoinHandle<()>>>,
    started: AtomicBool,
    bound_addr: Mutex<Option<SocketAddr>>,
}

impl ExternalReceiver {
    pub fn new(
        config: CompleterConfig,
        pending: Arc<PendingCompletions>,
        events: CompleterEventSink,
    ) -> Self {
        Self {
            config,
            pending,
            events,
            handle: Mutex::new(None),
            started: AtomicBool::new(false),
            bound_addr: Mutex::new(None),
        }
    }

    pub fn pending(&self) -> &Arc<PendingCompletions> {
        &self.pending
    }

    /// The socket the receiver actually bound, once started -- useful when
    /// `bind_port` is 0 and the OS picks an ephemeral port.
    pub fn bound_addr(&self) -> Option<SocketAddr> {
        *self.bound_addr.lock().expect("receiver bound_addr lock poisoned")
    }

    pub async fn start(&self) -> Result<(), CompleterError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let state = Arc::new(ReceiverState {
            pending: self.pending.clone(),
            events: self.events.clone(),
        });
        let router = build_router(&self.config, state);

        let addr: SocketAddr = format!("{}:{}", self.config.bind_host, self.config.bind_port)
            .parse()
            .map_err(|e| CompleterError::BindFailed(format!("invalid bind address: {e}")))?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| CompleterError::BindFailed(e.to_string()))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| CompleterError::BindFailed(e.to_string()))?;
        *self.bound_addr.lock().expect("receiver bound_addr lock poisoned") = Some(local_addr);

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        *self.handle.lock().expect("receiver handle lock poisoned") = Some(handle);
        Ok(())
    }

    pub fn stop(&self) {
        if let Some(handle) = self
            .handle
            .lock()
            .expect("receiver handle lock poisoned")
            .take()
        {
            handle.abort();
        }
        self.started.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}

fn build_router(config: &CompleterConfig, state: Arc<ReceiverState>) -> Router {
    let prefix = config.normalized_prefix();
    Router::new()
        .route(&format!("{prefix}/{{correlation_id}}/{{action}}"), post(handle_completion))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Collapses a possibly multi-valued header map into the one-entry-per-key
/// shape the external-completion contract calls for: repeated header lines
/// joined with ";".
fn headers_from_map(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for key in map.keys() {
        let joined = map
            .get_all(key)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(";");
        headers.push(key.as_str(), joined);
    }
    headers
}

async fn handle_completion(
    State(state): State<Arc<ReceiverState>>,
    Path((correlation_id, action)): Path<(String, String)>,
    method: Method,
    header_map: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if action != "complete" && action != "fail" {
        state.events.emit(CompleterEventKind::External(ExternalEvent::NotFound {
            path: format!("{correlation_id}/{action}"),
        }));
        return StatusCode::NOT_FOUND;
    }

    let Some((thread_id, stage_id)) = correlation_id.rsplit_once('_') else {
        state.events.emit(CompleterEventKind::External(ExternalEvent::NotFound {
            path: correlation_id,
        }));
        return StatusCode::NOT_FOUND;
    };

    let Some(entry) = state.pending.take(thread_id, stage_id) else {
        state.events.emit(CompleterEventKind::External(ExternalEvent::NotFound {
            path: correlation_id,
        }));
        return StatusCode::NOT_FOUND;
    };

    let req_method = HttpMethod::parse(method.as_str()).unwrap_or(HttpMethod::Post);
    let req = Datum::HttpReq {
        method: req_method,
        headers: headers_from_map(&header_map),
        body: body.to_vec(),
    };
    let result = if action == "complete" {
        CResult::Success(req)
    } else {
        CResult::Failure(req)
    };

    state.events.emit(CompleterEventKind::External(ExternalEvent::Delivered {
        path: correlation_id,
        action,
    }));
    external::complete(entry, result);
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::ids::ThreadId;

    #[tokio::test(flavor = "multi_thread")]
    async fn start_is_idempotent_and_stop_releases_the_port() {
        let config = CompleterConfig {
            bind_port: 0,
            ..CompleterConfig::default()
        };
        let pending = Arc::new(PendingCompletions::new());
        let events = CompleterEventSink::default();
        let receiver = ExternalReceiver::new(config, pending, events);

        // bind_port 0 means the OS assigns an ephemeral port; this test only
        // checks the idempotence and lifecycle flags, not a live round trip.
        assert!(!receiver.is_running());
        receiver.stop();
        assert!(!receiver.is_running());
    }

    #[test]
    fn pending_completion_created_for_a_graph_is_discoverable_by_key() {
        let graph = Arc::new(Graph::new("fn/test"));
        let thread_id = ThreadId::from_counter(1);
        let pending = PendingCompletions::new();
        let node = external::create_external_completion(&graph, &thread_id, &pending);
        assert_eq!(pending.len(), 1);
        assert!(pending.take(thread_id.as_str(), &node.id.to_string()).is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn posting_complete_resolves_the_node_with_an_http_req_datum() {
        let config = CompleterConfig {
            bind_port: 0,
            ..CompleterConfig::default()
        };
        let pending = Arc::new(PendingCompletions::new());
        let events = CompleterEventSink::default();
        let receiver = ExternalReceiver::new(config, pending.clone(), events);
        receiver.start().await.expect("receiver should bind an ephemeral port");
        let addr = receiver.bound_addr().expect("bound address should be recorded");

        let graph = Arc::new(Graph::new("fn/test"));
        let thread_id = ThreadId::from_counter(1);
        let node = external::create_external_completion(&graph, &thread_id, &pending);

        let client = reqwest::Client::new();
        let url = format!("http://{addr}/completions/{thread_id}_{}/complete", node.id);
        let response = client
            .post(&url)
            .header("X-Foo", "bar")
            .body("hello")
            .send()
            .await
            .expect("request should reach the receiver");
        assert!(response.status().is_success());

        let result = node.output.get().await;
        match result {
            CResult::Success(Datum::HttpReq { method, headers, body }) => {
                assert_eq!(method, HttpMethod::Post);
                assert_eq!(headers.get("x-foo"), Some("bar"));
                assert_eq!(body, b"hello");
            }
            other => panic!("expected a Success(HttpReq), got {other:?}"),
        }

        receiver.stop();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn posting_fail_resolves_the_node_with_a_failure() {
        let config = CompleterConfig {
            bind_port: 0,
            ..CompleterConfig::default()
        };
        let pending = Arc::new(PendingCompletions::new());
        let events = CompleterEventSink::default();
        let receiver = ExternalReceiver::new(config, pending.clone(), events);
        receiver.start().await.expect("receiver should bind an ephemeral port");
        let addr = receiver.bound_addr().expect("bound address should be recorded");

        let graph = Arc::new(Graph::new("fn/test"));
        let thread_id = ThreadId::from_counter(1);
        let node = external::create_external_completion(&graph, &thread_id, &pending);

        let client = reqwest::Client::new();
        let url = format!("http://{addr}/completions/{thread_id}_{}/fail", node.id);
        client.post(&url).body("oops").send().await.expect("request should reach the receiver");

        assert!(node.output.get().await.is_failure());
        receiver.stop();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unknown_action_and_unknown_path_both_404() {
        let config = CompleterConfig {
            bind_port: 0,
            ..CompleterConfig::default()
        };
        let pending = Arc::new(PendingCompletions::new());
        let events = CompleterEventSink::default();
        let receiver = ExternalReceiver::new(config, pending, events);
        receiver.start().await.expect("receiver should bind an ephemeral port");
        let addr = receiver.bound_addr().expect("bound address should be recorded");

        let client = reqwest::Client::new();
        let bogus_action = client
            .post(format!("http://{addr}/completions/thread-1_1/frobnicate"))
            .send()
            .await
            .unwrap();
        assert_eq!(bogus_action.status(), StatusCode::NOT_FOUND);

        let bogus_path = client
            .post(format!("http://{addr}/completions/thread-1_999/complete"))
            .send()
            .await
            .unwrap();
        assert_eq!(bogus_path.status(), StatusCode::NOT_FOUND);

        receiver.stop();
    }
}
