//! Service-status feed adapter.
//!
//! Fetches the SIRI service-status document, reduces it to the set of lines
//! currently reported as delayed, and drives the reconciler on an interval.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod extract;
pub mod poller;
pub mod retry;
pub mod situation;
pub mod source;

pub use config::{DEFAULT_FEED_URL, FeedConfig};
pub use extract::{DELAYS_REASON, extract_raw_code, observed_delays};
pub use poller::{PollOutcome, Poller, PollerHandle};
pub use retry::{RetryPolicy, RetryState};
pub use situation::{Situation, parse_service_status};
pub use source::{HttpSituationSource, SituationSource};
