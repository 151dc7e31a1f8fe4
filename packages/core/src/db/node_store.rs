//! NodeStore Trait - Storage Abstraction Layer
//!
//! This module defines the `NodeStore` trait that abstracts node persistence
//! for the projection and reordering engine. The engine treats the node
//! collection as read-mostly: it consumes snapshots and change events, and
//! issues only targeted field updates (`parent_id`, `display_order`,
//! `default_expanded`).
//!
//! # Design Decisions
//!
//! 1. **Async-First**: all methods are async to support both embedded and
//!    network backends
//! 2. **Error Handling**: uses `anyhow::Result` for flexible error context;
//!    the service layer converts failures into its own taxonomy
//! 3. **Snapshot stream**: change notification is a broadcast of full
//!    snapshots rather than diffs, which keeps consumers stateless
//!
//! # Thread Safety
//!
//! Implementations must be `Send + Sync` so futures may move between threads.

use crate::db::StoreEvent;
use crate::models::{Node, OrderUpdate};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Abstraction layer for node persistence.
///
/// The engine never creates or deletes nodes through this trait; node
/// lifecycle is owned by other application features.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Read the complete current node collection.
    async fn all_nodes(&self) -> Result<Vec<Node>>;

    /// Get a node by ID.
    ///
    /// Returns `Ok(None)` if the node doesn't exist (not an error).
    async fn get_node(&self, id: &str) -> Result<Option<Node>>;

    /// Persist a single node's mutable fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist or the write fails.
    async fn update_node(&self, node: Node) -> Result<()>;

    /// Persist a batch of order assignments as one write.
    ///
    /// Used by the batch scheduler to commit a coalesced reorder. The batch
    /// is applied atomically with respect to the change stream: subscribers
    /// observe one snapshot containing all assignments.
    async fn update_order_batch(&self, updates: Vec<OrderUpdate>) -> Result<()>;

    /// Subscribe to change notifications.
    ///
    /// Every mutation emits a [`StoreEvent::NodesChanged`] carrying the full
    /// post-change snapshot.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}
