//! Domain Events for the Node Store
//!
//! This module defines the events emitted by a `NodeStore` implementation
//! when data changes. Events follow the observer pattern, allowing the view
//! layer to react to data changes without coupling to the storage backend.
//!
//! # Architecture
//!
//! Events are emitted using tokio's broadcast channel, allowing multiple
//! subscribers to receive notifications asynchronously.
//!
//! # Event Flow
//!
//! 1. The store performs a data operation (node update, batch order write)
//! 2. A `StoreEvent` carrying the full post-change snapshot is emitted
//! 3. All subscribers receive the event asynchronously
//! 4. `OutlineService` rebuilds its projection from the snapshot, unless an
//!    optimistic write is in flight, in which case the snapshot is suppressed

use crate::models::Node;

/// Change notification pushed by the store's read stream.
///
/// The stream is snapshot-based: every mutation re-emits the complete node
/// list, so consumers never have to patch incremental diffs.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// The underlying node collection changed; carries the full new snapshot.
    NodesChanged(Vec<Node>),
}

impl StoreEvent {
    /// Get a string representation of the event type, for logging.
    pub fn event_type(&self) -> &str {
        match self {
            StoreEvent::NodesChanged(_) => "nodes:changed",
        }
    }
}
