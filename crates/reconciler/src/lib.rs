//! Delay tracking for a fixed set of transit lines.
//!
//! Each poll produces an [`ObservedDelaySet`](transit_core::ObservedDelaySet)
//! of lines the feed currently reports as delayed. The [`Reconciler`] diffs
//! it against recorded status:
//!
//! - **not delayed → delayed**: open an episode at `now`
//! - **delayed → not delayed**: close the episode, add its length to the
//!   line's accumulator
//! - **unchanged**: nothing is written
//!
//! The [`UptimeCalculator`] turns accumulated delay into a percentage of the
//! time elapsed since the [`ProcessClock`] started.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use transit_core::{LineRegistry, ObservedDelaySet};
//! use transit_reconciler::{DelayStateStore, ProcessClock, Reconciler, UptimeCalculator};
//!
//! let store = Arc::new(DelayStateStore::new(LineRegistry::subway()));
//! store.initialize()?;
//! let clock = Arc::new(ProcessClock::new());
//! let reconciler = Reconciler::new(store.clone(), clock.clone());
//! let uptime = UptimeCalculator::new(store, clock);
//!
//! reconciler.initial_pass(&first_snapshot, start)?;
//! reconciler.reconcile(&next_snapshot, start + interval)?;
//! let pct = uptime.uptime_percentage(&line, now)?;
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod reconciler;
pub mod store;
pub mod types;
pub mod uptime;

pub use reconciler::Reconciler;
pub use store::{DelayStateStore, ProcessClock};
pub use types::{ClockAnomaly, LineState, ReconcileResult, Transition, TransitionKind};
pub use uptime::{UptimeCalculator, UptimeReport};
