//! Filter Modes
//!
//! The active selection criterion that determines which nodes are "matches"
//! for the filtered projection. Exactly one mode is active at a time.
//!
//! Expansion state is tracked per mode *kind*, not per mode value: all
//! `TextQuery` activations share one expansion slot, distinct from the
//! `TagMode` slot. The unfiltered mode has no slot at all; it reads each
//! node's persisted `default_expanded` flag instead.

use crate::models::Node;
use serde::{Deserialize, Serialize};

/// The active filter applied to the forest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FilterMode {
    /// Free browsing: the full hierarchy, no matching.
    #[default]
    None,
    /// Case-insensitive substring match on the node name.
    #[serde(rename = "textQuery")]
    TextQuery { query: String },
    /// Tag containment match (planning modes).
    #[serde(rename = "tagMode")]
    TagMode { tag: String },
}

impl FilterMode {
    pub fn text_query(query: impl Into<String>) -> Self {
        Self::TextQuery {
            query: query.into(),
        }
    }

    pub fn tag_mode(tag: impl Into<String>) -> Self {
        Self::TagMode { tag: tag.into() }
    }

    /// Whether this mode restricts visibility at all.
    ///
    /// A blank text query behaves like no filter, matching the search box
    /// being open but empty.
    pub fn is_active(&self) -> bool {
        match self {
            Self::None => false,
            Self::TextQuery { query } => !query.trim().is_empty(),
            Self::TagMode { .. } => true,
        }
    }

    /// The expansion slot this mode reads from, if any.
    pub fn kind(&self) -> Option<FilterModeKind> {
        match self {
            Self::None => None,
            Self::TextQuery { .. } => Some(FilterModeKind::TextQuery),
            Self::TagMode { .. } => Some(FilterModeKind::TagMode),
        }
    }

    /// Whether `node` satisfies this mode's predicate.
    ///
    /// `FilterMode::None` matches nothing: visibility is unrestricted there,
    /// so the question never arises.
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Self::None => false,
            Self::TextQuery { query } => {
                let q = query.trim();
                !q.is_empty() && node.name.to_lowercase().contains(&q.to_lowercase())
            }
            Self::TagMode { tag } => node.has_tag(tag),
        }
    }
}

/// Keys for the expansion state registry: one slot per filter-mode kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterModeKind {
    TextQuery,
    TagMode,
}
