//! A per-thread container mapping stage identifiers to nodes.

use crate::errors::CompleterError;
use crate::ids::{IdAllocator, StageId};
use crate::node::Node;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

pub struct Graph {
    pub function_id: String,
    nodes: RwLock<HashMap<u64, Arc<Node>>>,
    node_count: AtomicU64,
    active_count: AtomicI64,
    committed: AtomicBool,
    id_alloc: IdAllocator,
}

impl Graph {
    pub fn new(function_id: impl Into<String>) -> Self {
        Self {
            function_id: function_id.into(),
            nodes: RwLock::new(HashMap::new()),
            node_count: AtomicU64::new(0),
            active_count: AtomicI64::new(0),
            committed: AtomicBool::new(false),
            id_alloc: IdAllocator::new(),
        }
    }

    pub fn new_node_id(&self) -> StageId {
        self.id_alloc.next()
    }

    /// Inserts a freshly minted node. Ids are unique by construction so
    /// there is no collision case to handle.
    pub fn add_node(&self, node: Arc<Node>) -> Arc<Node> {
        let mut nodes = self.nodes.write().expect("graph node map lock poisoned");
        nodes.insert(node.id.value(), node.clone());
        self.node_count.fetch_add(1, Ordering::SeqCst);
        node
    }

    pub fn find_node(&self, id: StageId) -> Option<Arc<Node>> {
        self.nodes
            .read()
            .expect("graph node map lock poisoned")
            .get(&id.value())
            .cloned()
    }

    pub fn with_node<T>(
        &self,
        id: StageId,
        f: impl FnOnce(&Arc<Node>) -> T,
    ) -> Result<T, CompleterError> {
        let nodes = self.nodes.read().expect("graph node map lock poisoned");
        let node = nodes
            .get(&id.value())
            .ok_or_else(|| CompleterError::UnknownStage(id.to_string()))?;
        Ok(f(node))
    }

    pub fn with_nodes<T>(
        &self,
        ids: &[StageId],
        f: impl FnOnce(&[Arc<Node>]) -> T,
    ) -> Result<T, CompleterError> {
        let nodes = self.nodes.read().expect("graph node map lock poisoned");
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            let node = nodes
                .get(&id.value())
                .ok_or_else(|| CompleterError::UnknownStage(id.to_string()))?;
            resolved.push(node.clone());
        }
        drop(nodes);
        Ok(f(&resolved))
    }

    pub fn node_count(&self) -> u64 {
        self.node_count.load(Ordering::SeqCst)
    }

    pub fn active_count(&self) -> i64 {
        self.active_count.load(Ordering::SeqCst)
    }

    pub fn is_committed(&self) -> bool {
        self.committed.load(Ordering::SeqCst)
    }

    /// Compare-and-set `committed` from false to true; idempotent, returns
    /// whether this call was the one that flipped it.
    pub fn commit(&self) -> bool {
        self.committed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub(crate) fn mark_active(&self) {
        self.active_count.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn mark_inactive(&self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
    }
}
