//! Service Error Types
//!
//! Errors surfaced by [`OutlineService`](crate::services::OutlineService).
//! All gesture-level variants are advisory: the view stays consistent, the
//! gesture is simply refused.

use crate::operations::ReorderError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum OutlineError {
    /// A referenced node does not exist in the current snapshot.
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    /// The drop target cannot accept the dragged node (cross-parent drop,
    /// or any pairing the reorder engine refuses).
    #[error("Invalid move: {reason}")]
    InvalidMove { reason: String },

    /// Reparenting `id` under `new_parent_id` would make the node its own
    /// ancestor.
    #[error("Moving '{id}' under '{new_parent_id}' would create a cycle")]
    CycleDetected { id: String, new_parent_id: String },

    /// The store rejected a write.
    #[error("Persistence failed: {message}")]
    PersistenceFailed { message: String },
}

impl OutlineError {
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    pub fn invalid_move(reason: impl Into<String>) -> Self {
        Self::InvalidMove {
            reason: reason.into(),
        }
    }

    pub fn cycle_detected(id: impl Into<String>, new_parent_id: impl Into<String>) -> Self {
        Self::CycleDetected {
            id: id.into(),
            new_parent_id: new_parent_id.into(),
        }
    }

    pub fn persistence_failed(message: impl Into<String>) -> Self {
        Self::PersistenceFailed {
            message: message.into(),
        }
    }
}

impl From<ReorderError> for OutlineError {
    fn from(error: ReorderError) -> Self {
        match error {
            ReorderError::NotFound { id } => Self::NodeNotFound { id },
            ReorderError::NotSiblings { .. } => Self::InvalidMove {
                reason: error.to_string(),
            },
        }
    }
}
