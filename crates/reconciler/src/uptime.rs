//! Uptime percentages derived from recorded delay state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use transit_core::{Error, Line, Result, seconds_between};

use crate::store::{DelayStateStore, ProcessClock};

/// Point-in-time uptime figures for one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UptimeReport {
    pub line: Line,
    pub delayed: bool,
    /// Closed episodes plus the open one, as of the report time.
    pub delayed_seconds: f64,
    /// Seconds since the process clock started.
    pub elapsed_seconds: f64,
    /// `100 * (1 - delayed_seconds / elapsed_seconds)`. Not clamped.
    pub percentage: f64,
}

/// Reads the store and clock; never touches the feed.
#[derive(Debug, Clone)]
pub struct UptimeCalculator {
    store: Arc<DelayStateStore>,
    clock: Arc<ProcessClock>,
}

impl UptimeCalculator {
    #[must_use]
    pub const fn new(store: Arc<DelayStateStore>, clock: Arc<ProcessClock>) -> Self {
        Self { store, clock }
    }

    /// Percentage of elapsed process time `line` has not been delayed.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownLine` for an untracked line,
    /// `Error::NotInitialized` before the clock starts, and
    /// `Error::UptimeUndefined` when no time has elapsed.
    pub fn uptime_percentage(&self, line: &Line, now: DateTime<Utc>) -> Result<f64> {
        self.report(line, now).map(|report| report.percentage)
    }

    /// Full uptime breakdown for `line` as of `now`.
    ///
    /// # Errors
    ///
    /// Same as [`uptime_percentage`](Self::uptime_percentage).
    pub fn report(&self, line: &Line, now: DateTime<Utc>) -> Result<UptimeReport> {
        let state = self.store.get(line)?;
        let start = self.clock.start_time()?;

        let elapsed_seconds = seconds_between(start, now);
        if elapsed_seconds <= 0.0 {
            return Err(Error::UptimeUndefined {
                elapsed_secs: elapsed_seconds,
            });
        }

        let delayed_seconds = state.total_delay_seconds(now);
        let percentage = 100.0 * (1.0 - delayed_seconds / elapsed_seconds);

        Ok(UptimeReport {
            line: line.clone(),
            delayed: state.delayed,
            delayed_seconds,
            elapsed_seconds,
            percentage,
        })
    }
}
