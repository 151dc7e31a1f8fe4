//! Storage Layer
//!
//! This module defines the storage abstraction consumed by the engine:
//!
//! - [`NodeStore`] - async trait over node persistence (snapshot reads,
//!   targeted field updates, batched order writes, change events)
//! - [`StoreEvent`] - broadcast domain events carrying full snapshots
//! - [`MemoryStore`] - embedded in-memory reference backend
//!
//! The engine is backend-agnostic: production hosts plug in their own
//! `NodeStore` implementation over whatever record store they use.

pub mod events;
mod memory_store;
mod node_store;

pub use events::StoreEvent;
pub use memory_store::MemoryStore;
pub use node_store::NodeStore;
