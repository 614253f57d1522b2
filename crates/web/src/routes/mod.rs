//! HTTP routes
//!
//! ## Route Structure
//!
//! - `GET /` - Usage instructions
//! - `GET /health` - Health check endpoint
//! - `GET /status/{line}` - Whether a line is currently delayed
//! - `GET /uptime/{line}` - Percentage of time a line was not delayed
//! - `GET /api/lines` - Status of every tracked line
//!
//! Handlers only read state; the poller is the single writer.

use axum::{Router, routing::get};

use super::state::AppState;

pub mod health;
pub mod lines;

const USAGE: &str = "\
Subway line status and uptime.

GET /status/<line>   whether the line is currently delayed
GET /uptime/<line>   percentage of time the line has not been delayed
GET /api/lines       status of every line

Line codes are case-insensitive. Status refreshes on every feed poll.
";

/// GET / - Plain-text usage instructions
pub async fn usage() -> &'static str {
    USAGE
}

/// Create the route table without middleware.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(usage))
        .route("/health", get(health::health_check))
        .route("/status/{line}", get(lines::get_status))
        .route("/uptime/{line}", get(lines::get_uptime))
        .route("/api/lines", get(lines::list_lines))
}
