//! Line endpoints: GET /status/{line}, GET /uptime/{line}, GET /api/lines
//!
//! Line codes in the path are case-insensitive. Feed aliases such as `H`
//! are not accepted here; callers use the canonical code.

use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use transit_core::Line;

use super::super::error::Result;
use super::super::state::AppState;

/// Current status of one line
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    line: Line,
    delayed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    delayed_since: Option<DateTime<Utc>>,
    message: String,
}

/// Uptime figures for one line
#[derive(Debug, Serialize)]
pub struct UptimeResponse {
    line: Line,
    percentage: f64,
    delayed: bool,
    delayed_seconds: f64,
    elapsed_seconds: f64,
    message: String,
}

/// Response for listing lines
#[derive(Debug, Serialize)]
pub struct ListLinesResponse {
    lines: Vec<StatusResponse>,
    delayed_count: usize,
}

fn status_response(
    line: Line,
    delayed: bool,
    delayed_since: Option<DateTime<Utc>>,
) -> StatusResponse {
    let message = if delayed {
        format!("Line {line} is delayed")
    } else {
        format!("Line {line} is not delayed")
    };
    StatusResponse {
        line,
        delayed,
        delayed_since,
        message,
    }
}

/// GET /status/{line} - Whether a line is currently delayed
pub async fn get_status(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>> {
    let line = state.registry().parse(&code)?;
    let current = state.store.get(&line)?;
    debug!(line = %line, delayed = current.delayed, "Status requested");

    Ok(Json(status_response(line, current.delayed, current.delayed_since)))
}

/// GET /uptime/{line} - Share of process lifetime a line was not delayed
pub async fn get_uptime(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UptimeResponse>> {
    let line = state.registry().parse(&code)?;
    let report = state.uptime.report(&line, state.now())?;

    let message = format!(
        "Line {} is not delayed {}% of the time",
        report.line, report.percentage
    );
    Ok(Json(UptimeResponse {
        line: report.line,
        percentage: report.percentage,
        delayed: report.delayed,
        delayed_seconds: report.delayed_seconds,
        elapsed_seconds: report.elapsed_seconds,
        message,
    }))
}

/// GET /api/lines - Status of every tracked line, sorted by code
pub async fn list_lines(State(state): State<AppState>) -> Result<Json<ListLinesResponse>> {
    let lines: Vec<StatusResponse> = state
        .store
        .snapshot()?
        .into_iter()
        .map(|(line, s)| status_response(line, s.delayed, s.delayed_since))
        .collect();
    let delayed_count = lines.iter().filter(|s| s.delayed).count();

    Ok(Json(ListLinesResponse {
        lines,
        delayed_count,
    }))
}
