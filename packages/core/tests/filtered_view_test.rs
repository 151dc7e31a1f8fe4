//! Integration tests for the filtered view flow: projection, per-mode
//! expansion memory and persisted expansion, driven through the service
//! against the in-memory store.

use outline_core::db::{MemoryStore, NodeStore};
use outline_core::models::{FilterMode, Node};
use outline_core::operations::DropPosition;
use outline_core::services::OutlineService;
use std::sync::Arc;

fn node(id: &str, name: &str, parent: Option<&str>, order: i64) -> Node {
    let mut n = Node::new_with_id(id.to_string(), name.to_string(), parent.map(String::from));
    n.display_order = order;
    n
}

/// Projects → { Writing → { Draft chapter }, Chores }, Inbox
fn workspace() -> Vec<Node> {
    vec![
        node("projects", "Projects", None, 0),
        node("inbox", "Inbox", None, 1),
        node("writing", "Writing", Some("projects"), 0),
        node("chores", "Chores", Some("projects"), 1),
        node("draft", "Draft chapter", Some("writing"), 0),
    ]
}

async fn start() -> (Arc<MemoryStore>, Arc<OutlineService>) {
    let store = Arc::new(MemoryStore::with_nodes(workspace()).await);
    let service = OutlineService::start(store.clone() as Arc<dyn NodeStore>)
        .await
        .unwrap();
    (store, service)
}

#[tokio::test]
async fn test_text_query_shows_match_with_context_only() {
    let (_store, service) = start().await;

    service
        .set_filter_mode(FilterMode::text_query("draft"))
        .await;

    let view = service.current_view();
    // The match, its ancestors, nothing else.
    assert!(view.find("draft").is_some());
    assert!(view.find("writing").is_some());
    assert!(view.find("projects").is_some());
    assert!(view.find("chores").is_none());
    assert!(view.find("inbox").is_none());

    // First activation auto-expands the whole visible path.
    assert!(view.find("projects").unwrap().expanded);
    assert!(view.find("writing").unwrap().expanded);
}

#[tokio::test]
async fn test_collapse_survives_mode_round_trip() {
    let (_store, service) = start().await;

    service
        .set_filter_mode(FilterMode::text_query("draft"))
        .await;
    service.toggle_expanded("writing").await.unwrap();
    assert!(!service.current_view().find("writing").unwrap().expanded);

    // Leave the filter, come back with the same query text.
    service.set_filter_mode(FilterMode::None).await;
    service
        .set_filter_mode(FilterMode::text_query("draft"))
        .await;

    assert!(!service.current_view().find("writing").unwrap().expanded);
}

#[tokio::test]
async fn test_clearing_query_restores_full_forest() {
    let (_store, service) = start().await;

    service
        .set_filter_mode(FilterMode::text_query("draft"))
        .await;
    service.set_filter_mode(FilterMode::None).await;

    let view = service.current_view();
    assert_eq!(view.len(), 5);
    // Unfiltered expansion comes from the persisted flag, all false here.
    assert!(!view.find("projects").unwrap().expanded);
}

#[tokio::test]
async fn test_reorder_under_filter_uses_full_sibling_group() {
    let (store, service) = start().await;

    // Only "writing" is visible under this query, but its reorder must
    // still be computed against the complete sibling group.
    service
        .set_filter_mode(FilterMode::text_query("writing"))
        .await;
    service
        .drag_drop("writing", "chores", DropPosition::After)
        .await
        .unwrap();
    service.flush().await;

    let writing = store.get_node("writing").await.unwrap().unwrap();
    let chores = store.get_node("chores").await.unwrap().unwrap();
    assert_eq!(chores.display_order, 0);
    assert_eq!(writing.display_order, 1);
}

#[tokio::test]
async fn test_tag_mode_has_its_own_expansion_memory() {
    let store = Arc::new(
        MemoryStore::with_nodes({
            let mut nodes = workspace();
            nodes[4].tags = vec!["focus".to_string()];
            nodes
        })
        .await,
    );
    let service = OutlineService::start(store as Arc<dyn NodeStore>)
        .await
        .unwrap();

    service
        .set_filter_mode(FilterMode::text_query("draft"))
        .await;
    service.toggle_expanded("writing").await.unwrap();

    // Same visible set under the tag mode, but a fresh slot: fully expanded.
    service.set_filter_mode(FilterMode::tag_mode("focus")).await;
    assert!(service.current_view().find("writing").unwrap().expanded);
}

#[tokio::test]
async fn test_persisted_expansion_reaches_other_subscribers() {
    let (_store, service) = start().await;
    let mut views = service.subscribe_view();

    service.toggle_expanded("projects").await.unwrap();

    views.changed().await.unwrap();
    let view = views.borrow().clone();
    assert!(view.find("projects").unwrap().expanded);
}
