//! Health check endpoint: GET /health

use axum::{extract::State, response::Json};
use serde::Serialize;

use super::super::error::Result;
use super::super::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
    initialized: bool,
    tracked_lines: usize,
}

/// GET /health - Liveness plus whether the first snapshot has been applied
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        initialized: state.uptime_ready(),
        tracked_lines: state.registry().len(),
    }))
}
