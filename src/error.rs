//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::services::{cloudinary::CloudinaryError, sheets::SheetsError};

/// Generic feedback failure, used when the body cannot be read at all.
pub const FEEDBACK_SEND_FAILED: &str = "피드백 전송 중 오류가 발생했습니다.";

/// User-facing message when the receipt image cannot be stored.
pub const IMAGE_UPLOAD_FAILED: &str = "이미지 업로드 중 오류가 발생했습니다.";

/// User-facing message when feedback cannot be written to the spreadsheet.
pub const FEEDBACK_SAVE_FAILED: &str = "피드백 저장에 실패했습니다. 다시 시도해주세요.";

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Validation Errors**: Missing fields, malformed bodies, bad files
/// - **Vendor Errors**: Cloudinary or Google Sheets calls that failed
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body or fields are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String is shown to the user as is.
    #[error("{0}")]
    InvalidRequest(String),

    /// Uploaded file is empty or not an image.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("{0}")]
    UnsupportedFile(String),

    /// Uploaded file exceeds the configured size limit.
    ///
    /// Returns HTTP 413 Payload Too Large.
    #[error("파일 크기는 {}MB 이하여야 합니다.", .limit / (1024 * 1024))]
    FileTooLarge { limit: usize },

    /// Request body could not be read or parsed at all.
    ///
    /// Returns HTTP 500 Internal Server Error with the endpoint's generic
    /// failure message. The parse error is logged and only shown in `details`
    /// in development.
    #[error("{message}")]
    UnreadableBody {
        message: &'static str,
        reason: String,
    },

    /// Receipt image could not be stored by Cloudinary.
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("Image upload failed: {0}")]
    ImageUpload(#[from] CloudinaryError),

    /// Spreadsheet read or write failed.
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("Spreadsheet error: {0}")]
    Sheets(#[from] SheetsError),
}

impl AppError {
    /// Attach vendor details to the response body (development only).
    pub fn with_details(self, expose: bool) -> DetailedError {
        DetailedError {
            error: self,
            expose,
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::UnsupportedFile(msg) => {
                (StatusCode::BAD_REQUEST, "unsupported_file", msg.clone())
            }
            AppError::FileTooLarge { .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "file_too_large",
                self.to_string(),
            ),
            AppError::UnreadableBody { message, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "unreadable_body",
                message.to_string(),
            ),
            AppError::ImageUpload(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "image_upload_failed",
                IMAGE_UPLOAD_FAILED.to_string(),
            ),
            AppError::Sheets(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "sheets_failed",
                FEEDBACK_SAVE_FAILED.to_string(),
            ),
        }
    }

    fn vendor_message(&self) -> Option<String> {
        match self {
            AppError::ImageUpload(e) => Some(e.to_string()),
            AppError::Sheets(e) => Some(e.to_string()),
            AppError::UnreadableBody { reason, .. } => Some(reason.clone()),
            _ => None,
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "success": false,
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Vendor failures never leak their message here; see [`DetailedError`].
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.with_details(false).into_response()
    }
}

/// An [`AppError`] that may carry the vendor message in a `details` field.
#[derive(Debug)]
pub struct DetailedError {
    error: AppError,
    expose: bool,
}

impl From<AppError> for DetailedError {
    fn from(error: AppError) -> Self {
        error.with_details(false)
    }
}

impl IntoResponse for DetailedError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.error.parts();

        let mut body = json!({
            "success": false,
            "error": {
                "code": code,
                "message": message
            }
        });

        if self.expose {
            if let Some(details) = self.error.vendor_message() {
                body["details"] = json!(details);
            }
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_too_large_message_uses_megabytes() {
        let err = AppError::FileTooLarge {
            limit: 5 * 1024 * 1024,
        };
        assert_eq!(err.to_string(), "파일 크기는 5MB 이하여야 합니다.");
    }

    #[test]
    fn status_codes_follow_variant() {
        let cases = [
            (
                AppError::InvalidRequest("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::UnsupportedFile("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::FileTooLarge { limit: 1 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                AppError::UnreadableBody {
                    message: FEEDBACK_SEND_FAILED,
                    reason: "EOF while parsing".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Sheets(SheetsError::Api {
                    status: 403,
                    message: "denied".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
