//! Typed domain events, the observability surface for this engine in place
//! of a logging crate: every state transition a host might care about
//! (a stage starting, resolving, failing; an external completion arriving;
//! a timer firing) is emitted here rather than printed.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompleterEvent {
    pub sequence_no: u64,
    pub kind: CompleterEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum CompleterEventKind {
    Thread(ThreadEvent),
    Stage(StageEvent),
    External(ExternalEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThreadEvent {
    Created { thread_id: String, function_id: String },
    Committed { thread_id: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageEvent {
    Registered {
        thread_id: String,
        stage_id: String,
        combinator: String,
    },
    Resolved {
        thread_id: String,
        stage_id: String,
        success: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExternalEvent {
    Registered { thread_id: String, stage_id: String, path: String },
    Delivered { path: String, action: String },
    NotFound { path: String },
}

pub trait CompleterEventObserver: Send + Sync {
    fn on_event(&self, event: &CompleterEvent);
}

impl<F> CompleterEventObserver for F
where
    F: Fn(&CompleterEvent) + Send + Sync,
{
    fn on_event(&self, event: &CompleterEvent) {
        self(event);
    }
}

pub type SharedCompleterEventObserver = Arc<dyn CompleterEventObserver>;
pub type CompleterEventSender = mpsc::UnboundedSender<CompleterEvent>;
pub type CompleterEventReceiver = mpsc::UnboundedReceiver<CompleterEvent>;

#[derive(Clone, Default)]
pub struct CompleterEventSink {
    observer: Option<SharedCompleterEventObserver>,
    sender: Option<CompleterEventSender>,
    sequence: Arc<std::sync::atomic::AtomicU64>,
}

impl CompleterEventSink {
    pub fn with_observer(observer: SharedCompleterEventObserver) -> Self {
        Self {
            observer: Some(observer),
            sender: None,
            sequence: Arc::new(std::sync::atomic::AtomicU64::new(0)),
        }
    }

    pub fn sender(mut self, sender: CompleterEventSender) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.observer.is_some() || self.sender.is_some()
    }

    pub fn emit(&self, kind: CompleterEventKind) {
        let sequence_no = self
            .sequence
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let event = CompleterEvent { sequence_no, kind };
        if let Some(observer) = self.observer.as_ref() {
            observer.on_event(&event);
        }
        if let Some(sender) = self.sender.as_ref() {
            let _ = sender.send(event);
        }
    }
}

pub fn completer_event_channel() -> (CompleterEventSender, CompleterEventReceiver) {
    mpsc::unbounded_channel()
}
