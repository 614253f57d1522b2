//! # transit-uptime
//!
//! ## Startup Sequence
//!
//! 1. **Configuration** - Defaults, TOML file, environment, then CLI flags
//! 2. **Delay State Store** - Every subway line starts not delayed
//! 3. **Bootstrap** - First feed snapshot seeds state and starts the process clock
//! 4. **Poller** - Fetch and reconcile on a fixed interval
//! 5. **Axum API** - Serve status and uptime until Ctrl+C
//!
//! Any startup failure halts with a clear error message. On shutdown the
//! server drains in-flight requests and the poller finishes its current cycle.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use transit_core::{LineRegistry, SystemTimeSource, TimeSource};
use transit_feed::{HttpSituationSource, Poller};
use transit_reconciler::{DelayStateStore, ProcessClock, Reconciler};
use transit_uptime::cli::Cli;
use transit_uptime::config::AppConfig;
use transit_web::{AppState, bind_and_serve, create_router};

const DEFAULT_LOG_FILTER: &str = "info,transit_uptime=debug,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let start_time = Instant::now();

    init_tracing();

    info!("Transit uptime service starting...");

    let config = AppConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .merge_cli(&cli);
    config.validate().context("Invalid configuration")?;

    let reconciler = init_reconciler().context("Delay state initialization failed")?;
    let time: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);

    let source =
        HttpSituationSource::new(&config.feed).context("Failed to create feed client")?;
    info!(url = source.url(), "Feed client ready");

    let poller = Arc::new(Poller::new(
        Arc::new(source),
        reconciler.clone(),
        Arc::clone(&time),
        &config.feed,
    ));

    let initial = poller.bootstrap().await.context(
        "Initial service-status fetch failed. Check the feed URL and network connectivity",
    )?;
    info!(
        delayed = initial.delayed_count,
        unrecognized = initial.unrecognized.len(),
        "Initial status recorded"
    );

    let poller_handle = Arc::clone(&poller).start();
    let app = create_router(AppState::from_reconciler(&reconciler, time));

    let startup_duration = start_time.elapsed();
    info!("Transit uptime service started in {:?}", startup_duration);
    if startup_duration.as_secs() >= 10 {
        warn!(
            "Startup took {:?}; the feed may be slow to respond",
            startup_duration
        );
    }

    let served = bind_and_serve(&config.server, app, wait_for_shutdown())
        .await
        .context("HTTP server failed");

    info!("Cleaning up...");
    poller_handle.shutdown().await;
    served?;

    info!("Transit uptime service stopped gracefully");
    Ok(())
}

/// Initialize tracing subscriber with environment filter.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Create the store for every subway line and wrap it in a reconciler.
fn init_reconciler() -> transit_core::Result<Reconciler> {
    let registry = LineRegistry::subway();
    info!(lines = registry.len(), "Tracking subway lines");

    let store = Arc::new(DelayStateStore::new(registry));
    store.initialize()?;

    Ok(Reconciler::new(store, Arc::new(ProcessClock::new())))
}

/// Wait for shutdown signal (Ctrl+C).
async fn wait_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown"),
        Err(err) => error!("Failed to listen for shutdown signal: {}", err),
    }
}
