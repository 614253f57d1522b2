//! Core types for transit-uptime.
//!
//! - [`Line`] and [`LineRegistry`]: the closed set of tracked lines
//! - [`ObservedDelaySet`]: what one feed snapshot reports as delayed
//! - [`TimeSource`]: where adapters get `now` from
//! - [`Error`] and [`Result`]: the shared error taxonomy

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

pub mod clock;
pub mod error;
pub mod line;
pub mod observed;
pub mod result;

pub use clock::{ManualTimeSource, SystemTimeSource, TimeSource, seconds_between};
pub use error::Error;
pub use line::{Line, LineRegistry, SUBWAY_LINES, canonical_code};
pub use observed::ObservedDelaySet;
pub use result::{Result, ResultExt};
