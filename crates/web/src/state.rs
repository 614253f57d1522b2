//! Shared handler state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use transit_core::{LineRegistry, TimeSource};
use transit_reconciler::{DelayStateStore, ProcessClock, Reconciler, UptimeCalculator};

/// Read-only view of the delay state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DelayStateStore>,
    pub clock: Arc<ProcessClock>,
    pub uptime: UptimeCalculator,
    pub time: Arc<dyn TimeSource>,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<DelayStateStore>,
        clock: Arc<ProcessClock>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let uptime = UptimeCalculator::new(Arc::clone(&store), Arc::clone(&clock));
        Self {
            store,
            clock,
            uptime,
            time,
        }
    }

    /// Share the reconciler's store and clock.
    #[must_use]
    pub fn from_reconciler(reconciler: &Reconciler, time: Arc<dyn TimeSource>) -> Self {
        Self::new(
            Arc::clone(reconciler.store()),
            Arc::clone(reconciler.clock()),
            time,
        )
    }

    #[must_use]
    pub fn registry(&self) -> &LineRegistry {
        self.store.registry()
    }

    /// Whether the initial pass has run.
    #[must_use]
    pub fn uptime_ready(&self) -> bool {
        self.clock.is_started()
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.time.now()
    }
}
