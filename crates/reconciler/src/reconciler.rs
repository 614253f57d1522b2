//! Reconciler implementation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use transit_core::{Line, ObservedDelaySet, Result, seconds_between};

use crate::store::{DelayStateStore, ProcessClock};
use crate::types::{ClockAnomaly, LineState, ReconcileResult, Transition};

/// Applies feed snapshots to the delay state store.
///
/// The only writer of [`DelayStateStore`]. Each pass holds the store's write
/// lock for its whole duration, so readers see either the state before a
/// poll or the state after it.
#[derive(Debug, Clone)]
pub struct Reconciler {
    store: Arc<DelayStateStore>,
    clock: Arc<ProcessClock>,
}

impl Reconciler {
    /// Create a reconciler over a store and clock.
    #[must_use]
    pub const fn new(store: Arc<DelayStateStore>, clock: Arc<ProcessClock>) -> Self {
        Self { store, clock }
    }

    /// Seed state from the first snapshot and start the process clock at `now`.
    ///
    /// Lines in `observed` open a delay episode at `now`. Every other line
    /// keeps the baseline; no delay before startup is inferred.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInitialized` if the store has not been initialized,
    /// and `Error::AlreadyInitialized` if the clock has already started.
    pub fn initial_pass(
        &self,
        observed: &ObservedDelaySet,
        now: DateTime<Utc>,
    ) -> Result<ReconcileResult> {
        let mut guard = self.store.write()?;
        self.clock.start(now)?;

        let transitions: Vec<Transition> = guard
            .states_mut()
            .filter(|(line, _)| observed.contains(line))
            .map(|(line, state)| enter_delay(line, state, now))
            .collect();

        let result = ReconcileResult {
            at: now,
            transitions,
            anomalies: Vec::new(),
            unrecognized: unrecognized(observed),
            delayed_count: guard.delayed_count(),
        };

        info!(
            started_at = %now,
            delayed = result.delayed_count,
            "Initial pass complete"
        );
        Ok(result)
    }

    /// Diff `observed` against recorded status and apply transitions.
    ///
    /// A line entering `observed` opens an episode at `now`; a line leaving it
    /// closes its episode and adds the episode length to its accumulator.
    /// Lines whose status is unchanged are not touched.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInitialized` before [`initial_pass`](Self::initial_pass).
    pub fn reconcile(
        &self,
        observed: &ObservedDelaySet,
        now: DateTime<Utc>,
    ) -> Result<ReconcileResult> {
        self.clock.start_time()?;
        let mut guard = self.store.write()?;

        let mut transitions = Vec::new();
        let mut anomalies = Vec::new();

        for (line, state) in guard.states_mut() {
            match (state.delayed, observed.contains(line)) {
                (false, true) => transitions.push(enter_delay(line, state, now)),
                (true, false) => {
                    let (transition, anomaly) = exit_delay(line, state, now);
                    transitions.push(transition);
                    anomalies.extend(anomaly);
                }
                _ => {}
            }
        }

        let result = ReconcileResult {
            at: now,
            transitions,
            anomalies,
            unrecognized: unrecognized(observed),
            delayed_count: guard.delayed_count(),
        };

        debug!(
            changed = result.transitions.len(),
            delayed = result.delayed_count,
            "Reconciliation complete"
        );
        Ok(result)
    }

    /// The store this reconciler writes.
    #[must_use]
    pub const fn store(&self) -> &Arc<DelayStateStore> {
        &self.store
    }

    /// The process clock.
    #[must_use]
    pub const fn clock(&self) -> &Arc<ProcessClock> {
        &self.clock
    }
}

fn enter_delay(line: &Line, state: &mut LineState, now: DateTime<Utc>) -> Transition {
    state.delayed = true;
    state.delayed_since = Some(now);
    info!(line = %line, at = %now, "Line {line} is experiencing delays");
    Transition::entered(line.clone())
}

fn exit_delay(
    line: &Line,
    state: &mut LineState,
    now: DateTime<Utc>,
) -> (Transition, Option<ClockAnomaly>) {
    let raw_seconds = state
        .delayed_since
        .map_or(f64::NAN, |since| seconds_between(since, now));

    // NaN (no start recorded) and negative spans both count as zero.
    let (episode_seconds, anomaly) = if raw_seconds >= 0.0 {
        (raw_seconds, None)
    } else {
        warn!(
            line = %line,
            delayed_since = ?state.delayed_since,
            observed_at = %now,
            raw_seconds,
            "Delay episode closed before it opened; counting it as zero"
        );
        let anomaly = ClockAnomaly {
            line: line.clone(),
            delayed_since: state.delayed_since,
            observed_at: now,
            raw_seconds,
        };
        (0.0, Some(anomaly))
    };

    state.cumulative_delay_seconds += episode_seconds;
    state.delayed = false;
    state.delayed_since = None;
    info!(
        line = %line,
        at = %now,
        episode_seconds,
        "Line {line} is now recovered"
    );
    (Transition::exited(line.clone(), episode_seconds), anomaly)
}

fn unrecognized(observed: &ObservedDelaySet) -> Vec<String> {
    let codes: Vec<String> = observed.unrecognized().map(str::to_string).collect();
    if !codes.is_empty() {
        debug!(codes = ?codes, "Ignoring feed codes that match no tracked line");
    }
    codes
}
