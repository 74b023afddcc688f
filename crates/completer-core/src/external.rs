//! The pending-completions table the external-completion HTTP receiver
//! resolves into. A node created by `create_external_completion` has no
//! invoke task of its own -- it sits in this table until a POST request
//! (or `Completer::complete`/`fail` called in-process) resolves it.

use crate::cell::{output_cell, OutputResolver};
use crate::graph::Graph;
use crate::ids::{StageId, ThreadId};
use crate::node::Node;
use crate::result::CResult;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub(crate) struct PendingEntry {
    resolver: OutputResolver,
    graph: Arc<Graph>,
}

#[derive(Default)]
pub struct PendingCompletions {
    entries: RwLock<HashMap<String, PendingEntry>>,
}

fn correlation_key(thread_id: &str, stage_id: &str) -> String {
    format!("{thread_id}_{stage_id}")
}

impl PendingCompletions {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(
        &self,
        thread_id: &ThreadId,
        stage_id: StageId,
        graph: Arc<Graph>,
        resolver: OutputResolver,
    ) {
        let key = correlation_key(thread_id.as_str(), &stage_id.to_string());
        self.entries
            .write()
            .expect("pending completions lock poisoned")
            .insert(key, PendingEntry { resolver, graph });
    }

    pub(crate) fn take(&self, thread_id: &str, stage_id: &str) -> Option<PendingEntry> {
        self.entries
            .write()
            .expect("pending completions lock poisoned")
            .remove(&correlation_key(thread_id, stage_id))
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("pending completions lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registers a new node in `graph` that stays pending until `pending`
/// resolves it by correlation key. Marked active on creation since, unlike
/// every other node, there is no invoke task to do that bookkeeping.
pub fn create_external_completion(
    graph: &Arc<Graph>,
    thread_id: &ThreadId,
    pending: &PendingCompletions,
) -> Arc<Node> {
    let id = graph.new_node_id();
    let (resolver, output) = output_cell();
    let node = Arc::new(Node { id, output });
    graph.add_node(node.clone());
    graph.mark_active();
    pending.register(thread_id, id, graph.clone(), resolver);
    node
}

pub(crate) fn complete(entry: PendingEntry, result: CResult) {
    entry.graph.mark_inactive();
    entry.resolver.resolve(result);
}
