//! Data Models
//!
//! This module contains the core data structures used throughout the engine:
//!
//! - `Node` - a unit of the parent-pointer forest
//! - `OrderUpdate` - batched order-write unit
//! - `FilterMode` / `FilterModeKind` - the active selection criterion and
//!   the expansion-slot key derived from it

mod filter;
mod node;

pub use filter::{FilterMode, FilterModeKind};
pub use node::{Node, OrderUpdate};
