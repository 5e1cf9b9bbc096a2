//! Feedback handler.

use axum::{Json, body::Bytes, extract::State};
use chrono::Utc;

use crate::{
    error::{AppError, DetailedError, FEEDBACK_SEND_FAILED},
    models::feedback::{FeedbackRequest, FeedbackResponse},
    services::sheets::{FeedbackPlacement, format_timestamp},
    state::AppState,
};

/// Attach free-text feedback to an earlier submission.
///
/// # Request Body
///
/// ```json
/// { "feedback": "환급 잘 받았습니다", "phone": "010-1234-5678" }
/// ```
///
/// # Process
///
/// 1. Parse the body as JSON, whatever its `Content-Type` says
/// 2. Validate both fields (trimmed, non-empty)
/// 3. Find the latest spreadsheet row with the same phone digits
/// 4. Write the feedback into column F of that row, or append a new row
///    with the feedback in column G when there is no match
///
/// # Response
///
/// - **200**: `{ "success": true, "message": "피드백이 전송되었습니다." }`
/// - **400**: empty feedback, missing phone
/// - **500**: unparseable body, spreadsheet read/write failed
pub async fn submit_feedback(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FeedbackResponse>, DetailedError> {
    let expose = state.config.expose_error_details();

    let request: FeedbackRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Unreadable feedback body");
        AppError::UnreadableBody {
            message: FEEDBACK_SEND_FAILED,
            reason: e.to_string(),
        }
        .with_details(expose)
    })?;
    let feedback = request.validate()?;

    let placement = state
        .sheets
        .save_feedback(&feedback, format_timestamp(Utc::now()))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, phone = %feedback.phone, "Saving feedback failed");
            AppError::from(e).with_details(expose)
        })?;

    match placement {
        FeedbackPlacement::Matched { row } => {
            tracing::info!(phone = %feedback.phone, row, "Feedback attached to submission")
        }
        FeedbackPlacement::Appended => {
            tracing::info!(phone = %feedback.phone, "No submission for phone; feedback appended")
        }
    }

    Ok(Json(FeedbackResponse::sent()))
}
