//! Poller behavior against a scripted feed.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use transit_core::{Error, LineRegistry, ManualTimeSource, Result};
use transit_feed::{FeedConfig, PollOutcome, Poller, Situation, SituationSource};
use transit_reconciler::{DelayStateStore, ProcessClock, Reconciler, TransitionKind};

/// Replays queued responses; an empty queue means "no situations".
#[derive(Default)]
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<Situation>>>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    latency: Duration,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Vec<Situation>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SituationSource for ScriptedSource {
    async fn fetch_situations(&self) -> Result<Vec<Situation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let response = self.responses.lock().pop_front().unwrap_or(Ok(Vec::new()));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

fn delayed(code: &str) -> Situation {
    Situation::new("Delays", format!("[{code}] trains are running with delays"))
}

struct Harness {
    poller: Arc<Poller>,
    source: Arc<ScriptedSource>,
    time: Arc<ManualTimeSource>,
    reconciler: Reconciler,
    registry: LineRegistry,
}

fn harness(source: ScriptedSource, config: &FeedConfig) -> Harness {
    let registry = LineRegistry::new(["A", "B", "SR"]);
    let store = Arc::new(DelayStateStore::new(registry.clone()));
    store.initialize().unwrap();
    let reconciler = Reconciler::new(store, Arc::new(ProcessClock::new()));
    let time = Arc::new(ManualTimeSource::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).single().unwrap(),
    ));
    let source = Arc::new(source);
    let poller = Arc::new(Poller::new(
        source.clone(),
        reconciler.clone(),
        time.clone(),
        config,
    ));
    Harness {
        poller,
        source,
        time,
        reconciler,
        registry,
    }
}

fn fast_config() -> FeedConfig {
    FeedConfig {
        retry_base_delay_ms: 1,
        retry_max_delay_ms: 2,
        bootstrap_retries: 2,
        ..FeedConfig::default()
    }
}

#[tokio::test]
async fn test_bootstrap_seeds_initial_delays() {
    let h = harness(
        ScriptedSource::new(vec![Ok(vec![
            delayed("A"),
            delayed("H"),
            Situation::new("Planned Work", "[B] trains rerouted"),
        ])]),
        &fast_config(),
    );

    let result = h.poller.bootstrap().await.unwrap();
    assert_eq!(result.delayed_count, 2);

    let a = h.registry.parse("A").unwrap();
    let b = h.registry.parse("B").unwrap();
    let sr = h.registry.parse("SR").unwrap();
    assert!(h.reconciler.store().get(&a).unwrap().delayed);
    assert!(h.reconciler.store().get(&sr).unwrap().delayed);
    assert!(!h.reconciler.store().get(&b).unwrap().delayed);
    assert_eq!(
        h.reconciler.clock().start_time().unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).single().unwrap()
    );
}

#[tokio::test]
async fn test_failed_fetch_skips_cycle_without_recovering_lines() {
    let h = harness(
        ScriptedSource::new(vec![
            Ok(vec![delayed("A")]),
            Err(Error::fetch_failed("HTTP 503")),
            Ok(Vec::new()),
        ]),
        &fast_config(),
    );
    let a = h.registry.parse("A").unwrap();
    h.poller.bootstrap().await.unwrap();

    h.time.advance_secs(60);
    let outcome = h.poller.poll_once().await.unwrap();
    assert!(outcome.is_skipped());
    let state = h.reconciler.store().get(&a).unwrap();
    assert!(state.delayed);
    assert!(state.cumulative_delay_seconds.abs() < f64::EPSILON);

    h.time.advance_secs(60);
    let outcome = h.poller.poll_once().await.unwrap();
    let PollOutcome::Reconciled(result) = outcome else {
        panic!("expected a reconciled cycle");
    };
    let exit = result.transitions.first().unwrap();
    assert_eq!(exit.kind, TransitionKind::ExitedDelay);
    assert_eq!(exit.episode_seconds, Some(120.0));
    assert!(!h.reconciler.store().get(&a).unwrap().delayed);
}

#[tokio::test]
async fn test_parse_failure_also_skips_cycle() {
    let h = harness(
        ScriptedSource::new(vec![
            Ok(vec![delayed("B")]),
            Err(Error::feed_parse_failed("unexpected eof")),
        ]),
        &fast_config(),
    );
    h.poller.bootstrap().await.unwrap();

    let outcome = h.poller.poll_once().await.unwrap();
    let PollOutcome::Skipped { reason } = outcome else {
        panic!("expected a skipped cycle");
    };
    assert!(reason.contains("unexpected eof"));
    let b = h.registry.parse("B").unwrap();
    assert!(h.reconciler.store().get(&b).unwrap().delayed);
}

#[tokio::test]
async fn test_bootstrap_retries_transient_failures() {
    let h = harness(
        ScriptedSource::new(vec![
            Err(Error::fetch_failed("timeout")),
            Err(Error::fetch_failed("timeout")),
            Ok(vec![delayed("A")]),
        ]),
        &fast_config(),
    );

    let result = h.poller.bootstrap().await.unwrap();
    assert_eq!(result.delayed_count, 1);
    assert_eq!(h.source.calls(), 3);
}

#[tokio::test]
async fn test_bootstrap_gives_up_after_retries() {
    let h = harness(
        ScriptedSource::new(vec![
            Err(Error::fetch_failed("down")),
            Err(Error::fetch_failed("down")),
            Err(Error::fetch_failed("down")),
        ]),
        &fast_config(),
    );

    let result = h.poller.bootstrap().await;
    assert!(matches!(result, Err(Error::FetchFailed { .. })));
    assert!(!h.reconciler.clock().is_started());
    assert_eq!(h.source.calls(), 3);
}

#[tokio::test]
async fn test_poll_before_bootstrap_is_an_error() {
    let h = harness(ScriptedSource::new(Vec::new()), &fast_config());
    let result = h.poller.poll_once().await;
    assert!(matches!(result, Err(Error::NotInitialized { .. })));
}

#[tokio::test]
async fn test_running_loop_polls_and_stops() {
    let config = fast_config().with_poll_interval(Duration::from_millis(20));
    let h = harness(ScriptedSource::new(Vec::new()), &config);
    h.poller.bootstrap().await.unwrap();

    let handle = Arc::clone(&h.poller).start();
    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.shutdown().await;

    let calls = h.source.calls();
    assert!(calls >= 3, "expected several polls, saw {calls}");

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(h.source.calls(), calls);
}

#[tokio::test]
async fn test_slow_fetches_never_overlap() {
    let config = fast_config().with_poll_interval(Duration::from_millis(5));
    let h = harness(
        ScriptedSource::new(Vec::new()).with_latency(Duration::from_millis(30)),
        &config,
    );
    h.poller.bootstrap().await.unwrap();

    let handle = Arc::clone(&h.poller).start();
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.shutdown().await;

    assert!(h.source.calls() >= 2);
    assert_eq!(h.source.max_in_flight.load(Ordering::SeqCst), 1);
}
