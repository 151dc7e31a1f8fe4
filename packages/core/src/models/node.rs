//! Node Data Structures
//!
//! This module defines the `Node` struct shared by every component of the
//! projection and reordering engine.
//!
//! # Architecture
//!
//! - **Parent-pointer forest**: each node carries an optional `parent_id`
//!   reference, never an owning pointer; the hierarchy is derived, not stored
//! - **Dense ordering**: `display_order` is a dense integer sort key, unique
//!   within a sibling group immediately after a reorder completes
//! - **Externally owned lifecycle**: nodes are created and deleted by other
//!   application features; this crate only reads them and writes `parent_id`,
//!   `display_order` and `default_expanded`
//!
//! # Examples
//!
//! ```rust
//! use outline_core::models::Node;
//!
//! let root = Node::new("Projects".to_string(), None);
//! let child = Node::new("Rust crate".to_string(), Some(root.id.clone()));
//! assert_eq!(child.parent_id.as_deref(), Some(root.id.as_str()));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of the forest: a list, project or item with a parent reference
/// and a sort key.
///
/// # Fields
///
/// - `id`: stable unique key (UUID string)
/// - `name`: display name, also the target of text-query matching
/// - `parent_id`: optional reference to another node (`None` = root)
/// - `display_order`: dense integer sort key within the sibling group
/// - `tags`: free-form tags, the target of tag-mode matching
/// - `default_expanded`: persisted expansion flag, read only when no filter
///   is active (filtered views keep their own per-mode expansion state)
/// - `updated_at`: last modification timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Stable unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Parent node ID (`None` = top level)
    pub parent_id: Option<String>,

    /// Dense sort key within the sibling group
    pub display_order: i64,

    /// Tags used by tag-based planning modes
    #[serde(default)]
    pub tags: Vec<String>,

    /// Persisted expansion flag for the unfiltered view
    #[serde(default)]
    pub default_expanded: bool,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Create a new node with an auto-generated UUID.
    ///
    /// New nodes start collapsed with `display_order = 0`; callers that
    /// insert into an existing sibling group assign the real order.
    pub fn new(name: String, parent_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            parent_id,
            display_order: 0,
            tags: Vec::new(),
            default_expanded: false,
            updated_at: Utc::now(),
        }
    }

    /// Create a node with a caller-provided ID (deterministic test fixtures,
    /// import paths).
    pub fn new_with_id(id: String, name: String, parent_id: Option<String>) -> Self {
        Self {
            id,
            name,
            parent_id,
            display_order: 0,
            tags: Vec::new(),
            default_expanded: false,
            updated_at: Utc::now(),
        }
    }

    /// Refresh the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Whether the node carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A single entry of a batched order write: the node and its new dense
/// sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub id: String,
    pub display_order: i64,
}

impl OrderUpdate {
    pub fn new(id: impl Into<String>, display_order: i64) -> Self {
        Self {
            id: id.into(),
            display_order,
        }
    }
}
