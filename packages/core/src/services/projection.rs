//! Filtered Projection Engine
//!
//! Computes the visible, navigable subset of the forest for the active
//! filter mode: matches, plus their full ancestor chains (so a match is
//! always reachable from a root), plus their descendant subtrees.
//!
//! The engine is pure. It never touches the expansion registry itself;
//! when a filter produces results for the first time in a mode, the
//! initialization it wants persisted is handed back to the caller in
//! [`Projection::initialized_expansion`].

use crate::models::{FilterMode, Node};
use crate::services::hierarchy::{ancestors_of, descendants_of, Hierarchy};
use std::collections::{HashMap, HashSet};

/// A node paired with its rendered expansion flag.
///
/// Under `FilterMode::None` the flag is the node's persisted
/// `default_expanded`; under an active filter it is membership in the
/// mode's expansion set.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleNode {
    pub node: Node,
    pub expanded: bool,
}

/// The rendered view: top-level rows plus the children partition.
///
/// Sibling order is the same `display_order` as the unfiltered view;
/// filtering only hides, it never reorders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleHierarchy {
    pub top_level: Vec<VisibleNode>,
    pub children_of: HashMap<String, Vec<VisibleNode>>,
}

impl VisibleHierarchy {
    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty()
    }

    /// Total number of rendered nodes.
    pub fn len(&self) -> usize {
        self.top_level.len() + self.children_of.values().map(Vec::len).sum::<usize>()
    }

    /// Find a rendered node by ID, wherever it sits in the partition.
    pub fn find(&self, id: &str) -> Option<&VisibleNode> {
        self.top_level
            .iter()
            .chain(self.children_of.values().flatten())
            .find(|v| v.node.id == id)
    }
}

/// Result of one projection pass.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub view: VisibleHierarchy,
    /// Set when this pass initialized the active mode's expansion state;
    /// the caller must store it into the registry.
    pub initialized_expansion: Option<HashSet<String>>,
}

/// Project the flat node list through the active filter.
///
/// `stored_expansion` is the registry slot for the active mode's kind:
/// `None` means "not yet initialized for this activation". Ignored when the
/// filter is inactive.
pub fn project(
    nodes: &[Node],
    filter: &FilterMode,
    stored_expansion: Option<&HashSet<String>>,
) -> Projection {
    let hierarchy = Hierarchy::index(nodes);

    if !filter.is_active() {
        return Projection {
            view: unfiltered_view(&hierarchy),
            initialized_expansion: None,
        };
    }

    let matches: Vec<&Node> = nodes.iter().filter(|n| filter.matches(n)).collect();
    if matches.is_empty() {
        // Nothing visible, independent of expansion state.
        return Projection::default();
    }

    let mut visible_ids: HashSet<String> = HashSet::new();
    for matched in &matches {
        visible_ids.extend(ancestors_of(&matched.id, &hierarchy.by_id));
        visible_ids.extend(descendants_of(&matched.id, &hierarchy.children_of));
    }

    // First activation with results: auto-expand everything relevant and
    // report the initialization for the caller to persist.
    let (expanded_ids, initialized_expansion) = match stored_expansion {
        Some(stored) => (stored.clone(), None),
        None => (visible_ids.clone(), Some(visible_ids.clone())),
    };

    let visible: Vec<&Node> = nodes.iter().filter(|n| visible_ids.contains(&n.id)).collect();

    let mut top_level: Vec<VisibleNode> = visible
        .iter()
        .filter(|n| match &n.parent_id {
            None => true,
            // A visible node whose parent is hidden is promoted to the top
            // of the restricted view so it stays reachable.
            Some(pid) => !visible_ids.contains(pid),
        })
        .map(|n| visible_node(n, &expanded_ids))
        .collect();
    top_level.sort_by_key(|v| v.node.display_order);

    let mut children_of: HashMap<String, Vec<VisibleNode>> = HashMap::new();
    for node in &visible {
        if let Some(pid) = &node.parent_id {
            if visible_ids.contains(pid) {
                children_of
                    .entry(pid.clone())
                    .or_default()
                    .push(visible_node(node, &expanded_ids));
            }
        }
    }
    for group in children_of.values_mut() {
        group.sort_by_key(|v| v.node.display_order);
    }

    Projection {
        view: VisibleHierarchy {
            top_level,
            children_of,
        },
        initialized_expansion,
    }
}

fn visible_node(node: &Node, expanded_ids: &HashSet<String>) -> VisibleNode {
    VisibleNode {
        node: node.clone(),
        expanded: expanded_ids.contains(&node.id),
    }
}

fn unfiltered_view(hierarchy: &Hierarchy) -> VisibleHierarchy {
    let top_level = hierarchy
        .top_level
        .iter()
        .map(|n| VisibleNode {
            node: n.clone(),
            expanded: n.default_expanded,
        })
        .collect();

    let children_of = hierarchy
        .children_of
        .iter()
        .map(|(pid, group)| {
            (
                pid.clone(),
                group
                    .iter()
                    .map(|n| VisibleNode {
                        node: n.clone(),
                        expanded: n.default_expanded,
                    })
                    .collect(),
            )
        })
        .collect();

    VisibleHierarchy {
        top_level,
        children_of,
    }
}
