//! Feedback request/response types.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const FEEDBACK_REQUIRED: &str = "피드백을 입력해주세요.";
pub const PHONE_REQUIRED: &str = "전화번호가 필요합니다.";
pub const FEEDBACK_SENT: &str = "피드백이 전송되었습니다.";

/// Request body for `POST /api/feedback`.
///
/// ```json
/// { "feedback": "좋은 서비스네요", "phone": "010-1234-5678" }
/// ```
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Trimmed, non-empty feedback tied to a phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub phone: String,
    pub text: String,
}

impl FeedbackRequest {
    pub fn validate(self) -> Result<Feedback, AppError> {
        let text = self
            .feedback
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .ok_or_else(|| AppError::InvalidRequest(FEEDBACK_REQUIRED.to_string()))?;

        let phone = self
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::InvalidRequest(PHONE_REQUIRED.to_string()))?;

        Ok(Feedback { phone, text })
    }
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub message: String,
}

impl FeedbackResponse {
    pub fn sent() -> Self {
        Self {
            success: true,
            message: FEEDBACK_SENT.to_string(),
        }
    }
}
