//! Reorder Operation Error Types

use thiserror::Error;

/// Errors from the pure reorder engine.
///
/// Both variants are recoverable: the service converts them into advisory
/// no-ops, never fatal faults.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReorderError {
    /// A referenced node is missing from the sibling group (stale gesture).
    #[error("Node not found in sibling group: {id}")]
    NotFound { id: String },

    /// The dragged node and the drop target live in different sibling
    /// groups. Moving is only possible within the same level.
    #[error("Nodes '{from_id}' and '{to_id}' are not siblings")]
    NotSiblings { from_id: String, to_id: String },
}

impl ReorderError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn not_siblings(from_id: impl Into<String>, to_id: impl Into<String>) -> Self {
        Self::NotSiblings {
            from_id: from_id.into(),
            to_id: to_id.into(),
        }
    }
}
