//! Health check endpoint for service monitoring.

use crate::state::AppState;
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,

    /// Spreadsheet submissions are written to
    pub spreadsheet: String,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// Does not call out to Cloudinary or Google; it only reports that the
/// process is up and which spreadsheet it is configured for.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "spreadsheet": "1AbC...",
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        spreadsheet: state.sheets.spreadsheet_id().to_string(),
        timestamp: Utc::now(),
    })
}
