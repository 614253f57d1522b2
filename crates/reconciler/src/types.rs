//! Core types for the reconciler.

use chrono::{DateTime, Utc};
use serde::Serialize;
use transit_core::Line;

/// Recorded state of one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineState {
    /// Whether the line is currently delayed.
    pub delayed: bool,
    /// When the open delay episode started. `None` while not delayed.
    pub delayed_since: Option<DateTime<Utc>>,
    /// Seconds spent delayed in closed episodes; excludes the open one.
    pub cumulative_delay_seconds: f64,
}

impl LineState {
    /// Baseline state: not delayed, nothing accrued.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delayed: false,
            delayed_since: None,
            cumulative_delay_seconds: 0.0,
        }
    }

    /// Total delayed seconds as of `now`, including the open episode.
    #[must_use]
    pub fn total_delay_seconds(&self, now: DateTime<Utc>) -> f64 {
        let open = match (self.delayed, self.delayed_since) {
            (true, Some(since)) => transit_core::seconds_between(since, now),
            _ => 0.0,
        };
        self.cumulative_delay_seconds + open
    }
}

impl Default for LineState {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction of a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// The line went from running normally to delayed.
    EnteredDelay,
    /// The line recovered.
    ExitedDelay,
}

/// A status change applied during one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    /// The line that changed.
    pub line: Line,
    /// Which way it changed.
    pub kind: TransitionKind,
    /// Length of the closed episode, for `ExitedDelay`.
    pub episode_seconds: Option<f64>,
}

impl Transition {
    pub(crate) const fn entered(line: Line) -> Self {
        Self {
            line,
            kind: TransitionKind::EnteredDelay,
            episode_seconds: None,
        }
    }

    pub(crate) const fn exited(line: Line, episode_seconds: f64) -> Self {
        Self {
            line,
            kind: TransitionKind::ExitedDelay,
            episode_seconds: Some(episode_seconds),
        }
    }
}

/// An episode that closed before it opened.
///
/// The episode is counted as zero seconds; the raw value is kept for logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockAnomaly {
    /// The affected line.
    pub line: Line,
    /// When the episode was recorded as opening.
    pub delayed_since: Option<DateTime<Utc>>,
    /// The reconcile time that preceded it.
    pub observed_at: DateTime<Utc>,
    /// The negative (or missing) duration that was discarded.
    pub raw_seconds: f64,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileResult {
    /// The `now` the pass ran at.
    pub at: DateTime<Utc>,
    /// Status changes applied, in line order.
    pub transitions: Vec<Transition>,
    /// Episodes clamped to zero.
    pub anomalies: Vec<ClockAnomaly>,
    /// Raw feed codes that matched no tracked line.
    pub unrecognized: Vec<String>,
    /// Lines delayed after the pass.
    pub delayed_count: usize,
}

impl ReconcileResult {
    /// Whether nothing changed.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Lines that entered a delay during this pass.
    pub fn entered(&self) -> impl Iterator<Item = &Line> {
        self.transitions_of(TransitionKind::EnteredDelay)
    }

    /// Lines that recovered during this pass.
    pub fn exited(&self) -> impl Iterator<Item = &Line> {
        self.transitions_of(TransitionKind::ExitedDelay)
    }

    fn transitions_of(&self, kind: TransitionKind) -> impl Iterator<Item = &Line> {
        self.transitions
            .iter()
            .filter(move |t| t.kind == kind)
            .map(|t| &t.line)
    }
}
