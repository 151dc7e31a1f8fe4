//! Reorder Engine
//!
//! Pure functions that turn a drag instruction into a new dense order
//! assignment for the affected collection. No I/O, no shared state: the
//! caller applies the result optimistically and hands it to the batch
//! scheduler for persistence.
//!
//! # Guarantees
//!
//! Every successful result is a permutation of the input with
//! `display_order` reassigned to exactly `0..n-1`. The whole group is
//! reassigned, not just the moved element, so ties never accumulate.

use crate::models::Node;
use crate::operations::error::ReorderError;
use serde::{Deserialize, Serialize};

/// Which side of the drop target the dragged node lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DropPosition {
    Before,
    After,
}

/// Reorder a sibling group after dropping `from_id` onto `to_id`.
///
/// `siblings` must be one sibling group in its current sort order.
///
/// # Returns
///
/// - `Ok(Some(group))` - the reordered group with dense `display_order`
///   and refreshed `updated_at` on every element
/// - `Ok(None)` - nothing to do (`from_id == to_id`)
/// - `Err(NotFound)` - a referenced node is missing (stale gesture)
/// - `Err(NotSiblings)` - the nodes belong to different parents
pub fn reorder_siblings(
    siblings: &[Node],
    from_id: &str,
    to_id: &str,
    position: DropPosition,
) -> Result<Option<Vec<Node>>, ReorderError> {
    if from_id == to_id {
        return Ok(None);
    }

    let from_index = siblings
        .iter()
        .position(|n| n.id == from_id)
        .ok_or_else(|| ReorderError::not_found(from_id))?;
    let to_index = siblings
        .iter()
        .position(|n| n.id == to_id)
        .ok_or_else(|| ReorderError::not_found(to_id))?;

    if siblings[from_index].parent_id != siblings[to_index].parent_id {
        return Err(ReorderError::not_siblings(from_id, to_id));
    }

    let mut group = siblings.to_vec();
    let moved = group.remove(from_index);

    // Four cases: removal shifts indices when moving forward, and the drop
    // side decides which neighbour of the target we land next to.
    let insertion_index = if from_index < to_index {
        match position {
            DropPosition::Before => to_index - 1,
            DropPosition::After => to_index,
        }
    } else {
        match position {
            DropPosition::Before => to_index,
            DropPosition::After => to_index + 1,
        }
    };

    let final_index = insertion_index.min(group.len());
    group.insert(final_index, moved);

    Ok(Some(reassign_dense(group)))
}

/// Move `from_id` to the first position among its current siblings.
///
/// This is the drop-onto-own-parent case: the parent itself is a
/// legitimate, unambiguous anchor meaning "first child", not a cross-level
/// move. Returns `Ok(None)` when the node is already first.
pub fn move_to_first(siblings: &[Node], from_id: &str) -> Result<Option<Vec<Node>>, ReorderError> {
    let from_index = siblings
        .iter()
        .position(|n| n.id == from_id)
        .ok_or_else(|| ReorderError::not_found(from_id))?;

    if from_index == 0 {
        return Ok(None);
    }

    let mut group = siblings.to_vec();
    let moved = group.remove(from_index);
    group.insert(0, moved);

    Ok(Some(reassign_dense(group)))
}

/// Reorder a flat display list by index (e.g. an undifferentiated backlog).
///
/// `to_index` is a drop-gap index in the coordinates of the *original*
/// list; indices past the end clamp to the tail. Returns `None` when the
/// move is out of bounds or leaves the list unchanged.
pub fn reorder_linear(items: &[Node], from_index: usize, to_index: usize) -> Option<Vec<Node>> {
    if from_index >= items.len() || from_index == to_index {
        return None;
    }

    let mut list = items.to_vec();
    let moved = list.remove(from_index);

    let insertion_index = if to_index >= list.len() + 1 {
        list.len()
    } else if from_index < to_index {
        to_index - 1
    } else {
        to_index
    };

    if insertion_index == from_index {
        return None;
    }
    list.insert(insertion_index, moved);

    Some(reassign_dense(list))
}

/// Reassign `display_order = position index` across the whole sequence.
fn reassign_dense(mut group: Vec<Node>) -> Vec<Node> {
    for (index, node) in group.iter_mut().enumerate() {
        node.display_order = index as i64;
        node.touch();
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sibling(id: &str, order: i64) -> Node {
        let mut n = Node::new_with_id(id.to_string(), id.to_uppercase(), Some("p".to_string()));
        n.display_order = order;
        n
    }

    fn group(ids: &[&str]) -> Vec<Node> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| sibling(id, i as i64))
            .collect()
    }

    fn ids(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    fn assert_dense(nodes: &[Node]) {
        for (index, node) in nodes.iter().enumerate() {
            assert_eq!(
                node.display_order, index as i64,
                "order must be dense 0..n-1"
            );
        }
    }

    /// [X, Y, Z], drag X onto Z with After, lands as [Y, Z, X].
    #[test]
    fn test_forward_after() {
        let result = reorder_siblings(&group(&["x", "y", "z"]), "x", "z", DropPosition::After)
            .unwrap()
            .unwrap();
        assert_eq!(ids(&result), vec!["y", "z", "x"]);
        assert_dense(&result);
    }

    #[test]
    fn test_forward_before() {
        let result = reorder_siblings(&group(&["x", "y", "z"]), "x", "z", DropPosition::Before)
            .unwrap()
            .unwrap();
        assert_eq!(ids(&result), vec!["y", "x", "z"]);
        assert_dense(&result);
    }

    #[test]
    fn test_backward_before() {
        let result = reorder_siblings(&group(&["x", "y", "z"]), "z", "x", DropPosition::Before)
            .unwrap()
            .unwrap();
        assert_eq!(ids(&result), vec!["z", "x", "y"]);
        assert_dense(&result);
    }

    #[test]
    fn test_backward_after() {
        let result = reorder_siblings(&group(&["x", "y", "z"]), "z", "x", DropPosition::After)
            .unwrap()
            .unwrap();
        assert_eq!(ids(&result), vec!["x", "z", "y"]);
        assert_dense(&result);
    }

    /// Round-trip law: Before then the inverse After restores a pair.
    #[test]
    fn test_swap_round_trip_restores_order() {
        let original = group(&["a", "b"]);
        let first = reorder_siblings(&original, "a", "b", DropPosition::Before).unwrap();
        // a Before b from position 0 is already satisfied: unchanged layout.
        let after_first = first.unwrap_or_else(|| original.clone());
        let second = reorder_siblings(&after_first, "b", "a", DropPosition::After)
            .unwrap()
            .unwrap_or_else(|| after_first.clone());
        assert_eq!(ids(&second), vec!["a", "b"]);
    }

    /// Permutation property: same elements, dense orders, no duplicates.
    #[test]
    fn test_result_is_dense_permutation() {
        let input = group(&["a", "b", "c", "d", "e"]);
        let result = reorder_siblings(&input, "b", "e", DropPosition::After)
            .unwrap()
            .unwrap();

        let mut input_ids: Vec<&str> = ids(&input);
        let mut result_ids: Vec<&str> = ids(&result);
        input_ids.sort_unstable();
        result_ids.sort_unstable();
        assert_eq!(input_ids, result_ids);
        assert_dense(&result);
    }

    #[test]
    fn test_same_node_is_noop() {
        let result = reorder_siblings(&group(&["x", "y"]), "x", "x", DropPosition::Before).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_missing_node_is_rejected() {
        let err =
            reorder_siblings(&group(&["x", "y"]), "ghost", "y", DropPosition::Before).unwrap_err();
        assert_eq!(err, ReorderError::not_found("ghost"));
    }

    #[test]
    fn test_cross_parent_pair_is_rejected() {
        let mut nodes = group(&["x", "y"]);
        nodes[1].parent_id = Some("other".to_string());
        let err = reorder_siblings(&nodes, "x", "y", DropPosition::Before).unwrap_err();
        assert!(matches!(err, ReorderError::NotSiblings { .. }));
    }

    #[test]
    fn test_move_to_first_from_middle() {
        let result = move_to_first(&group(&["x", "y", "z"]), "z").unwrap().unwrap();
        assert_eq!(ids(&result), vec!["z", "x", "y"]);
        assert_dense(&result);
    }

    #[test]
    fn test_move_to_first_already_first_is_noop() {
        let result = move_to_first(&group(&["x", "y"]), "x").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_reorder_linear_to_end() {
        let result = reorder_linear(&group(&["x", "y", "z"]), 0, 3).unwrap();
        assert_eq!(ids(&result), vec!["y", "z", "x"]);
        assert_dense(&result);
    }

    #[test]
    fn test_reorder_linear_forward_gap_index() {
        // Dropping into the gap before original index 2.
        let result = reorder_linear(&group(&["x", "y", "z"]), 0, 2).unwrap();
        assert_eq!(ids(&result), vec!["y", "x", "z"]);
    }

    #[test]
    fn test_reorder_linear_backward() {
        let result = reorder_linear(&group(&["x", "y", "z"]), 2, 0).unwrap();
        assert_eq!(ids(&result), vec!["z", "x", "y"]);
    }

    #[test]
    fn test_reorder_linear_noop_and_out_of_bounds() {
        let items = group(&["x", "y"]);
        assert!(reorder_linear(&items, 1, 1).is_none());
        assert!(reorder_linear(&items, 5, 0).is_none());
        // Gap immediately after the element is the same position.
        assert!(reorder_linear(&items, 0, 1).is_none());
    }

    #[test]
    fn test_orders_normalize_even_from_sparse_input() {
        let mut nodes = group(&["x", "y", "z"]);
        nodes[0].display_order = 10;
        nodes[1].display_order = 20;
        nodes[2].display_order = 35;

        let result = reorder_siblings(&nodes, "y", "z", DropPosition::After)
            .unwrap()
            .unwrap();
        assert_eq!(ids(&result), vec!["x", "z", "y"]);
        assert_dense(&result);
    }
}
