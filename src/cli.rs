//! CLI flags using clap.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::path::PathBuf;

use clap::Parser;

/// Transit uptime service
#[derive(Parser, Debug, Default)]
#[command(name = "transit-uptime")]
#[command(version)]
#[command(
    about = "Polls the subway service-status feed and serves per-line delay status and uptime"
)]
#[command(
    long_about = "Polls the subway service-status feed on an interval, logs every line that enters or leaves a delay, and serves each line's current status and uptime percentage over HTTP."
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to serve HTTP on (e.g. 0.0.0.0:5000)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Service-status document URL
    #[arg(long)]
    pub feed_url: Option<String>,

    /// Seconds between feed polls
    #[arg(short, long)]
    pub interval_secs: Option<u64>,
}
