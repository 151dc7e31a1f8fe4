//! Optimistic Batch Scheduler
//!
//! Coalesces rapid successive reorders into a single debounced store write,
//! and guards the local optimistic state against late-arriving stale
//! snapshots while that write is pending.
//!
//! # State Machine
//!
//! `Idle → Pending(timer) → Idle`. Each [`ReorderScheduler::apply`] cancels
//! any pending timer and replaces the pending batch, so only the latest
//! ordering inside a debounce window is ever persisted. Intermediate states
//! still reach the live view through the caller's optimistic update; they
//! are just never written individually.
//!
//! # Race Guard
//!
//! From the first `apply` until the *latest* scheduled write confirms, the
//! write-in-flight latch is raised. Every batch carries a generation number;
//! a completing write only lowers the latch when no newer batch has been
//! applied since, so a slow write finishing under a newer pending batch
//! leaves the guard up. The view layer checks the latch before accepting a
//! store snapshot, which prevents the read stream from snapping the view
//! back to a pre-write state.
//!
//! # Failure
//!
//! A failed write is surfaced as [`WriteOutcome::Failed`]; local state is
//! not trusted after that, and the subscriber is expected to trigger a full
//! reload from the store.

use crate::db::NodeStore;
use crate::models::OrderUpdate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Default debounce window for coalescing drag gestures.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Terminal result of one scheduled write, broadcast to subscribers.
#[derive(Debug, Clone)]
pub enum WriteOutcome {
    /// The batch landed; carries the number of rows written.
    Persisted(usize),
    /// The store rejected the batch; local state must be resynced.
    Failed(String),
}

struct PendingBatch {
    updates: Vec<OrderUpdate>,
    generation: u64,
    timer: JoinHandle<()>,
}

#[derive(Default)]
struct SchedulerState {
    pending: Option<PendingBatch>,
    /// Generation of the most recent `apply`. A write lowers the latch only
    /// when its own generation is still the latest.
    latest_generation: u64,
}

struct SchedulerInner {
    store: Arc<dyn NodeStore>,
    debounce: Duration,
    state: Mutex<SchedulerState>,
    write_in_flight: AtomicBool,
    outcomes: broadcast::Sender<WriteOutcome>,
}

impl SchedulerInner {
    /// The pending batch stays valid even if a holder panicked, so recover
    /// from poisoning instead of propagating the panic.
    fn lock_state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Debounced, coalescing writer for reorder batches.
///
/// At most one write per collection is in flight at a time; the latch is
/// observable through [`ReorderScheduler::write_pending`].
pub struct ReorderScheduler {
    inner: Arc<SchedulerInner>,
}

impl ReorderScheduler {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self::with_debounce(store, DEFAULT_DEBOUNCE)
    }

    /// Create a scheduler with a custom debounce window (primarily for
    /// testing).
    pub fn with_debounce(store: Arc<dyn NodeStore>, debounce: Duration) -> Self {
        let (outcomes, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(SchedulerInner {
                store,
                debounce,
                state: Mutex::new(SchedulerState::default()),
                write_in_flight: AtomicBool::new(false),
                outcomes,
            }),
        }
    }

    /// Schedule a reorder batch for persistence.
    ///
    /// Replaces any not-yet-fired batch (coalescing) and restarts the
    /// debounce timer. The caller has already applied the ordering to its
    /// in-memory state; this only handles the write.
    pub fn apply(&self, updates: Vec<OrderUpdate>) {
        let mut state = self.inner.lock_state();

        if let Some(previous) = state.pending.take() {
            previous.timer.abort();
            tracing::debug!(
                superseded = previous.updates.len(),
                "coalescing reorder: superseding pending batch"
            );
        }

        state.latest_generation += 1;
        let generation = state.latest_generation;
        self.inner.write_in_flight.store(true, Ordering::Release);

        let inner = Arc::clone(&self.inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            SchedulerInner::fire(&inner).await;
        });

        state.pending = Some(PendingBatch {
            updates,
            generation,
            timer,
        });
    }

    /// Whether a batch is pending or a write is in flight.
    ///
    /// While this is `true`, store snapshots must not overwrite local view
    /// state.
    pub fn write_pending(&self) -> bool {
        self.inner.write_in_flight.load(Ordering::Acquire)
    }

    /// Convert any pending debounce into an immediate write.
    ///
    /// Called on navigation-away or teardown so no user-visible reorder is
    /// silently lost. A no-op when idle.
    pub async fn flush(&self) {
        let batch = {
            let mut state = self.inner.lock_state();
            state.pending.take().map(|p| {
                p.timer.abort();
                (p.updates, p.generation)
            })
        };

        if let Some((updates, generation)) = batch {
            tracing::debug!(rows = updates.len(), "flushing pending reorder batch");
            SchedulerInner::write(&self.inner, updates, generation).await;
        }
    }

    /// Subscribe to write outcomes.
    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<WriteOutcome> {
        self.inner.outcomes.subscribe()
    }
}

impl SchedulerInner {
    /// Timer body: take whatever batch is current and write it.
    async fn fire(inner: &Arc<SchedulerInner>) {
        let batch = {
            let mut state = inner.lock_state();
            state.pending.take().map(|p| (p.updates, p.generation))
        };

        // A racing apply() may have replaced and aborted us already.
        if let Some((updates, generation)) = batch {
            Self::write(inner, updates, generation).await;
        }
    }

    async fn write(inner: &Arc<SchedulerInner>, updates: Vec<OrderUpdate>, generation: u64) {
        let count = updates.len();
        let result = inner.store.update_order_batch(updates).await;

        // A newer batch may have been applied while this write was in
        // flight; the latch must stay raised until that batch confirms.
        {
            let state = inner.lock_state();
            if state.latest_generation == generation {
                inner.write_in_flight.store(false, Ordering::Release);
            }
        }

        match result {
            Ok(()) => {
                tracing::debug!(rows = count, "reorder batch persisted");
                let _ = inner.outcomes.send(WriteOutcome::Persisted(count));
            }
            Err(error) => {
                tracing::warn!(rows = count, %error, "reorder batch write failed");
                let _ = inner.outcomes.send(WriteOutcome::Failed(error.to_string()));
            }
        }
    }
}
