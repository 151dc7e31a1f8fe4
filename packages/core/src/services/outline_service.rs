//! Outline Service
//!
//! The stateful facade that ties the pure pieces together: it holds the
//! current node snapshot, the active filter mode and the per-mode expansion
//! registry, publishes the projected view through a `watch` channel, and
//! routes drag gestures through the reorder engine and the batch scheduler.
//!
//! # Data Flow
//!
//! ```text
//! store events ──▶ snapshot ──▶ project() ──▶ watch::Sender<VisibleHierarchy>
//!                     ▲                              │
//!                     │ optimistic apply             ▼
//! drag gesture ──▶ reorder engine ──▶ scheduler ──▶ store write
//! ```
//!
//! Reorders are applied to the local snapshot first and persisted through
//! the debounced scheduler; while a write is pending, incoming store
//! snapshots are dropped so the view cannot snap back to a stale order.
//! Structural edits (reparenting, expansion-flag writes) persist
//! immediately, not through the scheduler.

use crate::db::{NodeStore, StoreEvent};
use crate::models::{FilterMode, Node, OrderUpdate};
use crate::operations::{
    move_to_first, reorder_linear, reorder_siblings, DropPosition, ReorderScheduler, WriteOutcome,
};
use crate::services::error::OutlineError;
use crate::services::expansion::ExpansionRegistry;
use crate::services::hierarchy::{ancestors_of, descendants_of, Hierarchy};
use crate::services::projection::{project, VisibleHierarchy};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tokio::task::JoinHandle;

const NOTICE_CHANNEL_CAPACITY: usize = 16;

/// Out-of-band events for the embedding UI layer.
#[derive(Debug, Clone)]
pub enum Notice {
    /// A debounced reorder batch failed to persist. The view has already
    /// been resynced from the store when this is sent.
    PersistenceFailed { message: String },
}

struct ViewState {
    nodes: Vec<Node>,
    filter: FilterMode,
    expansion: ExpansionRegistry,
}

/// Hierarchy projection and reordering engine over a [`NodeStore`].
///
/// Cheap to share: hand out `Arc<OutlineService>` and subscribe to the view
/// from as many consumers as needed.
pub struct OutlineService {
    store: Arc<dyn NodeStore>,
    state: RwLock<ViewState>,
    scheduler: ReorderScheduler,
    view_tx: watch::Sender<VisibleHierarchy>,
    notices: broadcast::Sender<Notice>,
    listeners: Mutex<Vec<JoinHandle<()>>>,
}

impl OutlineService {
    /// Load the initial snapshot, publish the first view and start the
    /// store / scheduler listeners.
    pub async fn start(store: Arc<dyn NodeStore>) -> Result<Arc<Self>, OutlineError> {
        let nodes = store
            .all_nodes()
            .await
            .map_err(|e| OutlineError::persistence_failed(e.to_string()))?;

        let initial = project(&nodes, &FilterMode::None, None).view;
        let (view_tx, _) = watch::channel(initial);
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);

        let service = Arc::new(Self {
            scheduler: ReorderScheduler::new(Arc::clone(&store)),
            store,
            state: RwLock::new(ViewState {
                nodes,
                filter: FilterMode::None,
                expansion: ExpansionRegistry::new(),
            }),
            view_tx,
            notices,
            listeners: Mutex::new(Vec::new()),
        });

        // Subscribe before returning so no event can slip past the listeners.
        let events = service.store.subscribe();
        let outcomes = service.scheduler.subscribe_outcomes();
        let store_listener = tokio::spawn(Self::run_store_listener(Arc::clone(&service), events));
        let outcome_listener =
            tokio::spawn(Self::run_outcome_listener(Arc::clone(&service), outcomes));
        service
            .listeners
            .lock()
            .await
            .extend([store_listener, outcome_listener]);

        Ok(service)
    }

    /// Subscribe to the projected view. The receiver always holds the
    /// latest published hierarchy.
    pub fn subscribe_view(&self) -> watch::Receiver<VisibleHierarchy> {
        self.view_tx.subscribe()
    }

    /// Subscribe to out-of-band notices (persistence failures).
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// The currently published view.
    pub fn current_view(&self) -> VisibleHierarchy {
        self.view_tx.borrow().clone()
    }

    /// Switch the active filter mode and republish.
    ///
    /// Changing the text of an already-active query resets that mode's
    /// expansion slot, so the auto-expansion re-runs against the new result
    /// set. Switching between mode kinds keeps each slot as it was.
    pub async fn set_filter_mode(&self, filter: FilterMode) {
        let mut state = self.state.write().await;

        let reset_kind = match (&state.filter, &filter) {
            (FilterMode::TextQuery { query: old }, FilterMode::TextQuery { query: new })
                if old != new =>
            {
                filter.kind()
            }
            _ => None,
        };
        if let Some(kind) = reset_kind {
            state.expansion.reset(kind);
        }

        state.filter = filter;
        self.republish(&mut state);
    }

    /// Flip a node's expansion in the current mode.
    ///
    /// Under `FilterMode::None` this is a persisted `default_expanded`
    /// write; under an active filter it only touches the session-scoped
    /// registry slot.
    pub async fn toggle_expanded(&self, id: &str) -> Result<(), OutlineError> {
        let mut state = self.state.write().await;

        match state.filter.kind() {
            Some(kind) if state.filter.is_active() => {
                state.expansion.toggle(kind, id);
                self.republish(&mut state);
                Ok(())
            }
            _ => {
                let node = state
                    .nodes
                    .iter_mut()
                    .find(|n| n.id == id)
                    .ok_or_else(|| OutlineError::node_not_found(id))?;
                node.default_expanded = !node.default_expanded;
                node.touch();
                let updated = node.clone();
                self.republish(&mut state);
                drop(state);

                self.store
                    .update_node(updated)
                    .await
                    .map_err(|e| OutlineError::persistence_failed(e.to_string()))
            }
        }
    }

    /// Handle a drop of `from_id` onto `to_id`.
    ///
    /// Same sibling group: positional reorder. Drop onto the node's own
    /// parent: move to first child. Anything else is refused as an invalid
    /// move. The new order is applied to the view immediately and persisted
    /// through the debounced scheduler.
    pub async fn drag_drop(
        &self,
        from_id: &str,
        to_id: &str,
        position: DropPosition,
    ) -> Result<(), OutlineError> {
        let mut state = self.state.write().await;

        let from = Self::find_node(&state.nodes, from_id)?.clone();
        let to = Self::find_node(&state.nodes, to_id)?.clone();

        let hierarchy = Hierarchy::index(&state.nodes);
        let reordered = if from.parent_id == to.parent_id {
            let siblings = hierarchy.siblings_of(from.parent_id.as_deref());
            reorder_siblings(siblings, from_id, to_id, position)?
        } else if from.parent_id.as_deref() == Some(to_id) {
            // The parent itself is a valid anchor meaning "first child".
            let siblings = hierarchy.siblings_of(Some(to_id));
            move_to_first(siblings, from_id)?
        } else {
            return Err(OutlineError::invalid_move(format!(
                "'{from_id}' cannot be dropped onto '{to_id}': different levels"
            )));
        };

        if let Some(group) = reordered {
            self.apply_optimistic(&mut state, group);
        }
        Ok(())
    }

    /// Reorder a sibling group by flat list indices (undifferentiated
    /// lists, e.g. a project's item sequence).
    ///
    /// `to_index` is a drop-gap index in original-list coordinates. Out of
    /// bounds or no-op moves are silently ignored.
    pub async fn linear_reorder(&self, parent_id: Option<&str>, from_index: usize, to_index: usize) {
        let mut state = self.state.write().await;
        let hierarchy = Hierarchy::index(&state.nodes);
        let siblings = hierarchy.siblings_of(parent_id);

        if let Some(group) = reorder_linear(siblings, from_index, to_index) {
            self.apply_optimistic(&mut state, group);
        }
    }

    /// Reparent `id` under `new_parent_id` (`None` = top level), appended
    /// after the existing children.
    ///
    /// Refused when the target parent sits inside the node's own subtree.
    /// The new parent is expanded so the moved node is immediately visible.
    /// Structural writes persist immediately, not through the scheduler.
    pub async fn move_to_parent(
        &self,
        id: &str,
        new_parent_id: Option<&str>,
    ) -> Result<(), OutlineError> {
        let mut state = self.state.write().await;

        let node = Self::find_node(&state.nodes, id)?.clone();
        if node.parent_id.as_deref() == new_parent_id {
            return Ok(());
        }

        let hierarchy = Hierarchy::index(&state.nodes);
        if let Some(parent_id) = new_parent_id {
            Self::find_node(&state.nodes, parent_id)?;
            if descendants_of(id, &hierarchy.children_of).contains(parent_id) {
                return Err(OutlineError::cycle_detected(id, parent_id));
            }
        }

        // Close the gap in the old group.
        let old_group: Vec<Node> = hierarchy
            .siblings_of(node.parent_id.as_deref())
            .iter()
            .filter(|n| n.id != id)
            .cloned()
            .collect();
        let mut order_updates: Vec<OrderUpdate> = Vec::with_capacity(old_group.len());
        for (index, sibling) in old_group.iter().enumerate() {
            if sibling.display_order != index as i64 {
                order_updates.push(OrderUpdate::new(&sibling.id, index as i64));
            }
        }

        let new_order = hierarchy.siblings_of(new_parent_id).len() as i64;
        let mut moved = node;
        moved.parent_id = new_parent_id.map(String::from);
        moved.display_order = new_order;
        moved.touch();

        // Apply locally, expanding the destination so the node stays visible.
        for target in state.nodes.iter_mut() {
            if target.id == moved.id {
                *target = moved.clone();
            } else if let Some(update) = order_updates.iter().find(|u| u.id == target.id) {
                target.display_order = update.display_order;
                target.touch();
            }
        }
        let mut expanded_parent = None;
        if let Some(parent_id) = new_parent_id {
            match state.filter.kind() {
                Some(kind) if state.filter.is_active() => {
                    state.expansion.expand(kind, parent_id);
                }
                _ => {
                    if let Some(parent) = state.nodes.iter_mut().find(|n| n.id == parent_id) {
                        if !parent.default_expanded {
                            parent.default_expanded = true;
                            parent.touch();
                            expanded_parent = Some(parent.clone());
                        }
                    }
                }
            }
        }
        self.republish(&mut state);
        drop(state);

        self.store
            .update_node(moved)
            .await
            .map_err(|e| OutlineError::persistence_failed(e.to_string()))?;
        if let Some(parent) = expanded_parent {
            self.store
                .update_node(parent)
                .await
                .map_err(|e| OutlineError::persistence_failed(e.to_string()))?;
        }
        if !order_updates.is_empty() {
            self.store
                .update_order_batch(order_updates)
                .await
                .map_err(|e| OutlineError::persistence_failed(e.to_string()))?;
        }
        Ok(())
    }

    /// Expand every ancestor of `id` in the current mode so the node is
    /// reachable by scrolling alone.
    pub async fn reveal_path(&self, id: &str) -> Result<(), OutlineError> {
        let mut state = self.state.write().await;
        Self::find_node(&state.nodes, id)?;

        let hierarchy = Hierarchy::index(&state.nodes);
        let ancestors: Vec<String> = ancestors_of(id, &hierarchy.by_id)
            .into_iter()
            .filter(|a| a.as_str() != id)
            .collect();

        let mut persisted = Vec::new();
        match state.filter.kind() {
            Some(kind) if state.filter.is_active() => {
                for ancestor in &ancestors {
                    state.expansion.expand(kind, ancestor);
                }
            }
            _ => {
                for node in state.nodes.iter_mut() {
                    if ancestors.contains(&node.id) && !node.default_expanded {
                        node.default_expanded = true;
                        node.touch();
                        persisted.push(node.clone());
                    }
                }
            }
        }
        self.republish(&mut state);
        drop(state);

        for node in persisted {
            self.store
                .update_node(node)
                .await
                .map_err(|e| OutlineError::persistence_failed(e.to_string()))?;
        }
        Ok(())
    }

    /// Force any pending reorder write now. Call on navigation-away.
    pub async fn flush(&self) {
        self.scheduler.flush().await;
    }

    /// Flush pending writes and stop the background listeners.
    pub async fn shutdown(&self) {
        self.scheduler.flush().await;
        for handle in self.listeners.lock().await.drain(..) {
            handle.abort();
        }
    }

    fn find_node<'a>(nodes: &'a [Node], id: &str) -> Result<&'a Node, OutlineError> {
        nodes
            .iter()
            .find(|n| n.id == id)
            .ok_or_else(|| OutlineError::node_not_found(id))
    }

    /// Apply a reordered sibling group to the local snapshot, republish and
    /// hand the batch to the scheduler.
    fn apply_optimistic(&self, state: &mut ViewState, group: Vec<Node>) {
        let updates: Vec<OrderUpdate> = group
            .iter()
            .map(|n| OrderUpdate::new(&n.id, n.display_order))
            .collect();

        for node in state.nodes.iter_mut() {
            if let Some(replacement) = group.iter().find(|g| g.id == node.id) {
                *node = replacement.clone();
            }
        }
        self.republish(state);
        self.scheduler.apply(updates);
    }

    /// Recompute the projection from the current state and publish it.
    ///
    /// Stores the auto-expansion back into the registry when the projection
    /// reports a first-activation initialization.
    fn republish(&self, state: &mut ViewState) {
        let stored = state
            .filter
            .kind()
            .and_then(|kind| state.expansion.get(kind).cloned());
        let projection = project(&state.nodes, &state.filter, stored.as_ref());

        if let (Some(kind), Some(initialized)) =
            (state.filter.kind(), projection.initialized_expansion)
        {
            state.expansion.set_initialized(kind, initialized);
        }
        // send_replace updates the value even while nobody is subscribed.
        self.view_tx.send_replace(projection.view);
    }

    /// Consume store change events, skipping snapshots that would clobber a
    /// pending optimistic reorder.
    async fn run_store_listener(
        service: Arc<OutlineService>,
        mut events: broadcast::Receiver<StoreEvent>,
    ) {
        loop {
            match events.recv().await {
                Ok(StoreEvent::NodesChanged(nodes)) => {
                    if service.scheduler.write_pending() {
                        tracing::debug!("dropping store snapshot: reorder write pending");
                        continue;
                    }
                    let mut state = service.state.write().await;
                    state.nodes = nodes;
                    service.republish(&mut state);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "store event stream lagged, resyncing");
                    if service.scheduler.write_pending() {
                        continue;
                    }
                    if let Err(error) = service.resync().await {
                        tracing::warn!(%error, "resync after lag failed");
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    /// Consume scheduler outcomes; a failed write invalidates the local
    /// optimistic state, so reload and tell the UI.
    async fn run_outcome_listener(
        service: Arc<OutlineService>,
        mut outcomes: broadcast::Receiver<WriteOutcome>,
    ) {
        loop {
            match outcomes.recv().await {
                Ok(WriteOutcome::Persisted(_)) => {}
                Ok(WriteOutcome::Failed(message)) => {
                    if let Err(error) = service.resync().await {
                        tracing::warn!(%error, "resync after failed write also failed");
                    }
                    let _ = service.notices.send(Notice::PersistenceFailed { message });
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    }

    /// Replace the local snapshot with a fresh store read and republish.
    async fn resync(&self) -> Result<(), OutlineError> {
        let nodes = self
            .store
            .all_nodes()
            .await
            .map_err(|e| OutlineError::persistence_failed(e.to_string()))?;
        let mut state = self.state.write().await;
        state.nodes = nodes;
        self.republish(&mut state);
        Ok(())
    }
}
