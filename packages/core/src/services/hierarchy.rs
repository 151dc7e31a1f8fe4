//! Hierarchy Index and Traversal
//!
//! Builds the derived `parent → children` / `id → node` maps from a flat
//! node list, and walks ancestor chains and descendant subtrees over them.
//!
//! # Cycle Protection
//!
//! Parent pointers live in external data and can be malformed. Every
//! traversal carries a visited set: the walk stops the moment it would
//! revisit a node, and the anomaly is logged as a data-integrity warning.
//! No repair is attempted.

use crate::models::Node;
use std::collections::{HashMap, HashSet};

/// Derived hierarchy maps for one node snapshot.
///
/// Rebuilt whenever the flat node list changes; never stored.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    /// Lookup by node ID.
    pub by_id: HashMap<String, Node>,
    /// Children grouped by parent ID, each group sorted by `display_order`.
    pub children_of: HashMap<String, Vec<Node>>,
    /// Nodes with no parent, sorted by `display_order`.
    pub top_level: Vec<Node>,
}

impl Hierarchy {
    /// Build the index from a flat node list. Pure, O(n log n) in the sort.
    ///
    /// Empty input yields an empty hierarchy.
    pub fn index(nodes: &[Node]) -> Self {
        let mut by_id = HashMap::with_capacity(nodes.len());
        let mut children_of: HashMap<String, Vec<Node>> = HashMap::new();
        let mut top_level = Vec::new();

        for node in nodes {
            by_id.insert(node.id.clone(), node.clone());
            match &node.parent_id {
                Some(parent_id) => children_of
                    .entry(parent_id.clone())
                    .or_default()
                    .push(node.clone()),
                None => top_level.push(node.clone()),
            }
        }

        top_level.sort_by_key(|n| n.display_order);
        for group in children_of.values_mut() {
            group.sort_by_key(|n| n.display_order);
        }

        Self {
            by_id,
            children_of,
            top_level,
        }
    }

    /// The ordered sibling group sharing `parent_id`.
    pub fn siblings_of(&self, parent_id: Option<&str>) -> &[Node] {
        match parent_id {
            None => &self.top_level,
            Some(pid) => self
                .children_of
                .get(pid)
                .map(|v| v.as_slice())
                .unwrap_or(&[]),
        }
    }
}

/// Collect `start_id` and every ancestor reachable through parent pointers.
///
/// Runs in O(depth). The walk terminates at a root or at the first repeated
/// ID (cycle), whichever comes first.
pub fn ancestors_of(start_id: &str, by_id: &HashMap<String, Node>) -> HashSet<String> {
    let mut ids = HashSet::new();
    let mut visited = HashSet::new();
    let mut current = Some(start_id.to_string());

    while let Some(id) = current {
        if !visited.insert(id.clone()) {
            tracing::warn!(node_id = %id, "cycle detected in parent chain, aborting ancestor walk");
            break;
        }
        if !by_id.contains_key(&id) {
            break;
        }
        ids.insert(id.clone());
        current = by_id.get(&id).and_then(|n| n.parent_id.clone());
    }
    ids
}

/// Collect `start_id` and every descendant reachable through `children_of`.
///
/// Runs in O(subtree size), bounded by the visited set even on malformed
/// (cyclic) data.
pub fn descendants_of(start_id: &str, children_of: &HashMap<String, Vec<Node>>) -> HashSet<String> {
    let mut ids = HashSet::new();
    let mut visited = HashSet::new();
    let mut stack = vec![start_id.to_string()];

    while let Some(id) = stack.pop() {
        if !visited.insert(id.clone()) {
            tracing::warn!(node_id = %id, "cycle detected in child map, skipping revisit");
            continue;
        }
        ids.insert(id.clone());
        if let Some(children) = children_of.get(&id) {
            for child in children {
                stack.push(child.id.clone());
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, parent: Option<&str>, order: i64) -> Node {
        let mut n = Node::new_with_id(id.to_string(), id.to_uppercase(), parent.map(String::from));
        n.display_order = order;
        n
    }

    /// A(root) → B → D, A → C
    fn sample_forest() -> Vec<Node> {
        vec![
            node("a", None, 0),
            node("b", Some("a"), 0),
            node("c", Some("a"), 1),
            node("d", Some("b"), 0),
        ]
    }

    #[test]
    fn test_index_partitions_and_sorts() {
        let hierarchy = Hierarchy::index(&sample_forest());

        assert_eq!(hierarchy.top_level.len(), 1);
        assert_eq!(hierarchy.top_level[0].id, "a");

        let children_of_a = &hierarchy.children_of["a"];
        assert_eq!(
            children_of_a.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
            vec!["b", "c"]
        );
        assert_eq!(hierarchy.by_id.len(), 4);
    }

    #[test]
    fn test_index_sorts_within_groups_regardless_of_input_order() {
        let nodes = vec![
            node("c", Some("a"), 2),
            node("a", None, 0),
            node("b", Some("a"), 1),
            node("d", Some("a"), 0),
        ];
        let hierarchy = Hierarchy::index(&nodes);
        assert_eq!(
            hierarchy.children_of["a"]
                .iter()
                .map(|n| n.id.as_str())
                .collect::<Vec<_>>(),
            vec!["d", "b", "c"]
        );
    }

    #[test]
    fn test_empty_input_yields_empty_hierarchy() {
        let hierarchy = Hierarchy::index(&[]);
        assert!(hierarchy.top_level.is_empty());
        assert!(hierarchy.children_of.is_empty());
        assert!(hierarchy.by_id.is_empty());
    }

    #[test]
    fn test_siblings_of_top_level_and_missing_parent() {
        let hierarchy = Hierarchy::index(&sample_forest());
        assert_eq!(hierarchy.siblings_of(None).len(), 1);
        assert_eq!(hierarchy.siblings_of(Some("b")).len(), 1);
        assert!(hierarchy.siblings_of(Some("ghost")).is_empty());
    }

    #[test]
    fn test_ancestors_include_self_and_full_chain() {
        let hierarchy = Hierarchy::index(&sample_forest());
        let ancestors = ancestors_of("d", &hierarchy.by_id);
        assert_eq!(
            ancestors,
            ["d", "b", "a"].iter().map(|s| s.to_string()).collect()
        );
    }

    #[test]
    fn test_descendants_include_self_and_subtree() {
        let hierarchy = Hierarchy::index(&sample_forest());
        let descendants = descendants_of("a", &hierarchy.children_of);
        assert_eq!(descendants.len(), 4);

        let leaf = descendants_of("d", &hierarchy.children_of);
        assert_eq!(leaf, ["d"].iter().map(|s| s.to_string()).collect());
    }

    #[test]
    fn test_ancestor_walk_terminates_on_cycle() {
        // a → b → a: malformed data, walk must not loop forever.
        let nodes = vec![
            node("a", Some("b"), 0),
            node("b", Some("a"), 0),
            node("c", Some("b"), 1),
        ];
        let hierarchy = Hierarchy::index(&nodes);

        let ancestors = ancestors_of("c", &hierarchy.by_id);
        assert!(ancestors.contains("c"));
        assert!(ancestors.contains("a"));
        assert!(ancestors.contains("b"));
        assert_eq!(ancestors.len(), 3);
    }

    #[test]
    fn test_descendant_walk_terminates_on_cycle() {
        let nodes = vec![node("a", Some("b"), 0), node("b", Some("a"), 0)];
        let hierarchy = Hierarchy::index(&nodes);

        let descendants = descendants_of("a", &hierarchy.children_of);
        assert_eq!(descendants.len(), 2);
    }

    #[test]
    fn test_ancestor_walk_stops_at_dangling_parent() {
        let nodes = vec![node("b", Some("ghost"), 0)];
        let hierarchy = Hierarchy::index(&nodes);
        let ancestors = ancestors_of("b", &hierarchy.by_id);
        assert_eq!(ancestors, ["b"].iter().map(|s| s.to_string()).collect());
    }
}
