//! In-Memory Node Store
//!
//! Embedded reference implementation of [`NodeStore`], backed by a
//! `HashMap` behind a tokio `RwLock`. Used by the test suite and by hosts
//! that want the engine without a persistent backend.
//!
//! Every mutation emits a [`StoreEvent::NodesChanged`] with the full new
//! snapshot, matching the contract real backends provide through their
//! change-data-capture streams.

use crate::db::{NodeStore, StoreEvent};
use crate::models::{Node, OrderUpdate};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};

/// Capacity of the event channel; snapshots are cheap to drop because a
/// lagged subscriber can always resync with `all_nodes`.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// In-memory [`NodeStore`] implementation.
pub struct MemoryStore {
    nodes: RwLock<HashMap<String, Node>>,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            nodes: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Create a store pre-populated with the given nodes.
    pub async fn with_nodes(nodes: Vec<Node>) -> Self {
        let store = Self::new();
        store.seed(nodes).await;
        store
    }

    /// Insert or replace nodes without going through the engine.
    ///
    /// Node creation belongs to other application features; this is their
    /// stand-in. Emits a change event like any other mutation.
    pub async fn seed(&self, nodes: Vec<Node>) {
        {
            let mut map = self.nodes.write().await;
            for node in nodes {
                map.insert(node.id.clone(), node);
            }
        }
        self.emit_snapshot().await;
    }

    async fn emit_snapshot(&self) {
        let snapshot = self.snapshot().await;
        // No subscribers is fine; send only fails when all receivers dropped.
        let _ = self.events.send(StoreEvent::NodesChanged(snapshot));
    }

    async fn snapshot(&self) -> Vec<Node> {
        let map = self.nodes.read().await;
        let mut nodes: Vec<Node> = map.values().cloned().collect();
        // Deterministic snapshot order: grouped by parent, then sort key.
        nodes.sort_by(|a, b| {
            (a.parent_id.as_deref(), a.display_order, a.id.as_str()).cmp(&(
                b.parent_id.as_deref(),
                b.display_order,
                b.id.as_str(),
            ))
        });
        nodes
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn all_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.snapshot().await)
    }

    async fn get_node(&self, id: &str) -> Result<Option<Node>> {
        let map = self.nodes.read().await;
        Ok(map.get(id).cloned())
    }

    async fn update_node(&self, node: Node) -> Result<()> {
        {
            let mut map = self.nodes.write().await;
            match map.get_mut(&node.id) {
                Some(existing) => *existing = node,
                None => bail!("cannot update unknown node '{}'", node.id),
            }
        }
        self.emit_snapshot().await;
        Ok(())
    }

    async fn update_order_batch(&self, updates: Vec<OrderUpdate>) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        {
            let mut map = self.nodes.write().await;
            // Validate the whole batch before applying any of it.
            for update in &updates {
                if !map.contains_key(&update.id) {
                    bail!("order batch references unknown node '{}'", update.id);
                }
            }
            for update in &updates {
                if let Some(node) = map.get_mut(&update.id) {
                    node.display_order = update.display_order;
                    node.touch();
                }
            }
        }
        self.emit_snapshot().await;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}
