//! The polling loop that drives reconciliation.
//!
//! Fetch and reconcile run back to back inside a single task, so two polls
//! never overlap. When a poll outlasts the interval, the missed ticks are
//! skipped rather than queued.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use transit_core::{ObservedDelaySet, Result, ResultExt, TimeSource};
use transit_reconciler::{ReconcileResult, Reconciler};

use crate::config::FeedConfig;
use crate::extract::observed_delays;
use crate::retry::RetryPolicy;
use crate::situation::Situation;
use crate::source::SituationSource;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// What one poll did.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The snapshot was applied.
    Reconciled(ReconcileResult),
    /// The fetch failed; state was left untouched.
    Skipped { reason: String },
}

impl PollOutcome {
    /// Whether the cycle was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Periodically fetches situations and feeds them to the reconciler.
pub struct Poller {
    source: Arc<dyn SituationSource>,
    reconciler: Reconciler,
    time: Arc<dyn TimeSource>,
    interval: Duration,
    bootstrap_policy: RetryPolicy,
}

impl Poller {
    /// Create a poller. Nothing runs until [`bootstrap`](Self::bootstrap).
    pub fn new(
        source: Arc<dyn SituationSource>,
        reconciler: Reconciler,
        time: Arc<dyn TimeSource>,
        config: &FeedConfig,
    ) -> Self {
        Self {
            source,
            reconciler,
            time,
            interval: config.poll_interval,
            bootstrap_policy: config.bootstrap_policy(),
        }
    }

    /// Fetch the first snapshot and run the initial pass.
    ///
    /// Transient fetch failures are retried with backoff.
    ///
    /// # Errors
    ///
    /// Returns the last fetch error once retries are exhausted, or the
    /// reconciler's lifecycle error if the store is not ready.
    pub async fn bootstrap(&self) -> Result<ReconcileResult> {
        let mut retry = self.bootstrap_policy.state();

        loop {
            match self.source.fetch_situations().await {
                Ok(situations) => {
                    let now = self.time.now();
                    let observed = self.observe(&situations);
                    return self
                        .reconciler
                        .initial_pass(&observed, now)
                        .inspect_error(|e| error!(error = %e, "Initial pass rejected"));
                }
                Err(e) => match retry.next_retry(&e) {
                    Some(delay) => {
                        warn!(
                            error = %e,
                            attempt = retry.current_attempt(),
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            "Initial fetch failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(e),
                },
            }
        }
    }

    /// Run one fetch-then-reconcile cycle.
    ///
    /// A failed fetch skips the cycle: reconciling against an empty set
    /// would mark every delayed line as recovered.
    ///
    /// # Errors
    ///
    /// Returns non-transient errors, such as polling before bootstrap.
    pub async fn poll_once(&self) -> Result<PollOutcome> {
        debug!("Checking for updates");

        let situations = match self.source.fetch_situations().await {
            Ok(situations) => situations,
            Err(e) if e.is_transient() => {
                warn!(error = %e, "Feed unavailable, skipping this cycle");
                return Ok(PollOutcome::Skipped {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        let now = self.time.now();
        let observed = self.observe(&situations);
        self.reconciler
            .reconcile(&observed, now)
            .map(PollOutcome::Reconciled)
    }

    /// Spawn the interval loop.
    ///
    /// The first tick is consumed immediately; bootstrap already covered it.
    #[must_use]
    pub fn start(self: Arc<Self>) -> PollerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        info!(interval_secs = self.interval.as_secs(), "Poller starting");

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval.max(MIN_INTERVAL));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Some(PollOutcome::Reconciled(result)) =
                            self.poll_once().await.into_option_logged("Poll failed")
                        {
                            debug!(
                                transitions = result.transitions.len(),
                                delayed = result.delayed_count,
                                "Poll applied"
                            );
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Poller stopped");
        });

        PollerHandle { stop_tx, task }
    }

    /// The poll interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    fn observe(&self, situations: &[Situation]) -> ObservedDelaySet {
        observed_delays(self.reconciler.store().registry(), situations)
    }
}

/// Handle for stopping a running poller.
#[derive(Debug)]
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Ask the loop to stop after the current cycle.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop and wait for the loop to exit.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            error!(error = %e, "Poller task ended abnormally");
        }
    }
}
