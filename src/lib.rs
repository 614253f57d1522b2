#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # transit-uptime
//!
//! Tracks which subway lines are delayed and how long each has been delayed
//! since the service started.
//!
//! This library re-exports the workspace crates for convenience.

pub use transit_core;
pub use transit_feed;
pub use transit_reconciler;
pub use transit_web;

pub mod cli;
pub mod config;
