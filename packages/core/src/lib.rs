//! # Outline Core
//!
//! Hierarchy projection and reordering engine for parent-pointer forests.
//!
//! The crate turns a flat node list into filtered, context-preserving
//! hierarchy views and handles drag-and-drop reordering with optimistic
//! updates and debounced batch persistence.
//!
//! ## Layers
//!
//! - [`models`]: `Node`, `FilterMode` and the order-update wire types
//! - [`db`]: the `NodeStore` trait, its change events and an in-memory
//!   implementation
//! - [`operations`]: pure reorder functions plus the debounced
//!   [`ReorderScheduler`](operations::ReorderScheduler)
//! - [`services`]: hierarchy indexing, filtered projection, expansion
//!   state and the [`OutlineService`](services::OutlineService) facade
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use outline_core::db::{MemoryStore, NodeStore};
//! use outline_core::models::Node;
//! use outline_core::operations::DropPosition;
//! use outline_core::services::OutlineService;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! store.seed(vec![
//!     Node::new("Projects".to_string(), None),
//!     Node::new("Someday".to_string(), None),
//! ]).await;
//!
//! let service = OutlineService::start(store as Arc<dyn NodeStore>).await?;
//! let view = service.current_view();
//! assert_eq!(view.top_level.len(), 2);
//!
//! let first = view.top_level[0].node.id.clone();
//! let second = view.top_level[1].node.id.clone();
//! service.drag_drop(&first, &second, DropPosition::After).await?;
//! service.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod models;
pub mod operations;
pub mod services;

pub use db::{MemoryStore, NodeStore, StoreEvent};
pub use models::{FilterMode, FilterModeKind, Node, OrderUpdate};
pub use operations::{DropPosition, ReorderScheduler, WriteOutcome};
pub use services::{Notice, OutlineError, OutlineService, VisibleHierarchy, VisibleNode};
