//! Expansion State Registry
//!
//! Session-scoped record of which nodes are rendered "open" under each
//! filter mode kind, independent from the node's persisted
//! `default_expanded` flag.
//!
//! One slot per [`FilterModeKind`], not per filter value: all text-query
//! activations share a slot, distinct from the tag-mode slot. A slot that
//! has never been written is *uninitialized* (`None`), which tells the
//! projection engine to auto-expand the first non-empty result set.
//! Toggling under `FilterMode::None` is not handled here; the service
//! routes it to the store as a `default_expanded` write.

use crate::models::FilterModeKind;
use std::collections::{HashMap, HashSet};

/// Per-mode expansion slots.
#[derive(Debug, Default)]
pub struct ExpansionRegistry {
    slots: HashMap<FilterModeKind, HashSet<String>>,
}

impl ExpansionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored set for a mode, or `None` if not yet initialized for the
    /// current activation.
    pub fn get(&self, kind: FilterModeKind) -> Option<&HashSet<String>> {
        self.slots.get(&kind)
    }

    /// Store the auto-expansion computed by the projection's first pass.
    pub fn set_initialized(&mut self, kind: FilterModeKind, ids: HashSet<String>) {
        self.slots.insert(kind, ids);
    }

    /// Flip a node's expansion under the given mode.
    ///
    /// Toggling an uninitialized slot initializes it to the single toggled
    /// node, so a manual toggle is never lost.
    pub fn toggle(&mut self, kind: FilterModeKind, id: &str) {
        let slot = self.slots.entry(kind).or_default();
        if !slot.remove(id) {
            slot.insert(id.to_string());
        }
    }

    /// Mark a node expanded without flipping (used when revealing a path or
    /// after moving a node under a new parent).
    pub fn expand(&mut self, kind: FilterModeKind, id: &str) {
        self.slots.entry(kind).or_default().insert(id.to_string());
    }

    /// Drop a mode's slot back to uninitialized.
    ///
    /// Called when the text of an active query changes: the next projection
    /// re-runs the auto-expansion against the new result set.
    pub fn reset(&mut self, kind: FilterModeKind) {
        self.slots.remove(&kind);
    }
}
