//! End-to-end delay accounting scenarios driven with fabricated clocks.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;
use transit_core::{Error, LineRegistry, ObservedDelaySet};
use transit_reconciler::{DelayStateStore, ProcessClock, Reconciler, UptimeCalculator};

fn t(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).single().unwrap() + TimeDelta::seconds(secs)
}

fn build(codes: &[&str]) -> (Reconciler, UptimeCalculator, LineRegistry) {
    let registry = LineRegistry::new(codes);
    let store = Arc::new(DelayStateStore::new(registry.clone()));
    store.initialize().unwrap();
    let clock = Arc::new(ProcessClock::new());
    (
        Reconciler::new(Arc::clone(&store), Arc::clone(&clock)),
        UptimeCalculator::new(store, clock),
        registry,
    )
}

#[test]
fn test_two_line_scenario() {
    let (reconciler, uptime, registry) = build(&["A", "B"]);
    let a = registry.parse("A").unwrap();
    let b = registry.parse("B").unwrap();

    let first = ObservedDelaySet::from_raw_codes(&registry, ["A"]);
    reconciler.initial_pass(&first, t(0)).unwrap();
    assert!(reconciler.store().get(&a).unwrap().delayed);
    assert!(!reconciler.store().get(&b).unwrap().delayed);

    reconciler.reconcile(&ObservedDelaySet::new(), t(60)).unwrap();
    let a_state = reconciler.store().get(&a).unwrap();
    assert!(!a_state.delayed);
    assert!((a_state.cumulative_delay_seconds - 60.0).abs() < 1e-9);

    let pct = uptime.uptime_percentage(&a, t(660)).unwrap();
    let expected = 100.0 * (1.0 - 60.0 / 660.0);
    assert!((pct - expected).abs() < 1e-9);
    assert!((pct - 90.909).abs() < 1e-3);

    let b_pct = uptime.uptime_percentage(&b, t(660)).unwrap();
    assert!((b_pct - 100.0).abs() < 1e-9);
}

#[test]
fn test_status_lookup_rejects_unknown_codes_in_any_case() {
    let (_, _, registry) = build(&["A", "B"]);
    for code in ["x", "X"] {
        assert!(matches!(
            registry.parse(code),
            Err(Error::UnknownLine { .. })
        ));
    }
    assert_eq!(registry.parse("b").unwrap().as_str(), "B");
}

#[test]
fn test_feed_rewrites_reach_canonical_lines() {
    let (reconciler, _, registry) = build(&["SR", "SF", "A"]);
    let first = ObservedDelaySet::from_raw_codes(&registry, ["H", "FS"]);
    let result = reconciler.initial_pass(&first, t(0)).unwrap();

    let entered: Vec<&str> = result.entered().map(|line| line.as_str()).collect();
    assert_eq!(entered, vec!["SF", "SR"]);
}

#[test]
fn test_concurrent_readers_see_consistent_state() {
    let (reconciler, uptime, registry) = build(&["A", "B"]);
    let a = registry.parse("A").unwrap();
    reconciler.initial_pass(&ObservedDelaySet::new(), t(0)).unwrap();

    let all: ObservedDelaySet = registry.iter().cloned().collect();
    std::thread::scope(|scope| {
        scope.spawn(|| {
            for step in 1..=50 {
                let observed = if step % 2 == 0 {
                    ObservedDelaySet::new()
                } else {
                    all.clone()
                };
                reconciler.reconcile(&observed, t(step * 10)).unwrap();
            }
        });
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let snapshot = reconciler.store().snapshot().unwrap();
                    let delayed = snapshot.iter().filter(|(_, s)| s.delayed).count();
                    // Every pass flips both lines together.
                    assert!(delayed == 0 || delayed == 2);
                    let _ = uptime.uptime_percentage(&a, t(1_000)).unwrap();
                }
            });
        }
    });

    let state = reconciler.store().get(&a).unwrap();
    assert!(!state.delayed);
    assert!((state.cumulative_delay_seconds - 250.0).abs() < 1e-9);
}

proptest! {
    /// Accumulated delay equals the sum of the closed episodes, no matter how
    /// many unchanged polls happen in between.
    #[test]
    fn prop_accumulator_matches_closed_episodes(
        polls in proptest::collection::vec(any::<bool>(), 1..60),
    ) {
        let (reconciler, _, registry) = build(&["A"]);
        let a = registry.parse("A").unwrap();
        let delayed: ObservedDelaySet = [a.clone()].into_iter().collect();
        reconciler.initial_pass(&ObservedDelaySet::new(), t(0)).unwrap();

        let mut expected = 0.0;
        let mut open_since: Option<i64> = None;
        for (i, is_delayed) in polls.iter().enumerate() {
            let now = i64::try_from(i + 1).unwrap() * 60;
            let observed = if *is_delayed {
                delayed.clone()
            } else {
                ObservedDelaySet::new()
            };
            reconciler.reconcile(&observed, t(now)).unwrap();

            match (open_since, *is_delayed) {
                (None, true) => open_since = Some(now),
                (Some(since), false) => {
                    #[allow(clippy::cast_precision_loss)]
                    let episode = (now - since) as f64;
                    expected += episode;
                    open_since = None;
                }
                _ => {}
            }
        }

        let state = reconciler.store().get(&a).unwrap();
        prop_assert!((state.cumulative_delay_seconds - expected).abs() < 1e-6);
        prop_assert_eq!(state.delayed, open_since.is_some());
    }

    /// With no open episode, uptime strictly rises as time passes.
    #[test]
    fn prop_uptime_rises_without_new_delays(
        delay_secs in 1_i64..600,
        first in 700_i64..10_000,
        gap in 1_i64..10_000,
    ) {
        let (reconciler, uptime, registry) = build(&["A"]);
        let a = registry.parse("A").unwrap();
        let delayed: ObservedDelaySet = [a.clone()].into_iter().collect();
        reconciler.initial_pass(&delayed, t(0)).unwrap();
        reconciler.reconcile(&ObservedDelaySet::new(), t(delay_secs)).unwrap();

        let earlier = uptime.uptime_percentage(&a, t(first)).unwrap();
        let later = uptime.uptime_percentage(&a, t(first + gap)).unwrap();
        prop_assert!(later > earlier);
        prop_assert!(later < 100.0);
    }
}
