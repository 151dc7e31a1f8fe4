//! Reorder operations: the pure engine plus the debounced persistence
//! scheduler that sits behind it.

pub mod error;
pub mod reorder;
pub mod scheduler;

pub use error::ReorderError;
pub use reorder::{move_to_first, reorder_linear, reorder_siblings, DropPosition};
pub use scheduler::{ReorderScheduler, WriteOutcome, DEFAULT_DEBOUNCE};
