//! Receipt submission models and field validation.
//!
//! This module defines:
//! - `SubmissionForm`: Raw multipart fields as they arrive from the browser
//! - `ReceiptSubmission`: A validated submission ready to forward to vendors
//! - `SubmissionResponse`: Response body returned to clients

use axum::body::Bytes;
use serde::Serialize;

use crate::error::AppError;

/// Shown when any required field is missing or blank.
pub const MISSING_FIELDS: &str = "모든 필드를 입력해주세요.";

/// Shown when the uploaded file is not an image.
pub const NOT_AN_IMAGE: &str = "이미지 파일만 업로드 가능합니다.";

/// Shown when the phone number has the wrong number of digits.
pub const INVALID_PHONE: &str = "전화번호 형식이 올바르지 않습니다.";

/// Shown on a successful submission.
pub const SUBMITTED: &str = "제출되었습니다.";

/// Warning attached when the image was stored but the spreadsheet append failed.
pub const SHEETS_WARNING: &str = "Google Sheets 저장에 실패했습니다. 관리자에게 문의해주세요.";

/// Receipt file pulled out of the multipart body.
#[derive(Debug, Clone)]
pub struct ReceiptImage {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ReceiptImage {
    /// Check the file is a non-empty image within the size limit.
    pub fn validate(&self, max_bytes: usize) -> Result<(), AppError> {
        if self.bytes.is_empty() {
            return Err(AppError::InvalidRequest(MISSING_FIELDS.to_string()));
        }

        if self.bytes.len() > max_bytes {
            return Err(AppError::FileTooLarge { limit: max_bytes });
        }

        if !self.content_type.starts_with("image/") {
            return Err(AppError::UnsupportedFile(NOT_AN_IMAGE.to_string()));
        }

        Ok(())
    }
}

/// Multipart fields collected before validation.
///
/// Every field is optional here because the browser may omit any of them.
#[derive(Debug, Default)]
pub struct SubmissionForm {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub account_number: Option<String>,
    pub bank: Option<String>,
    pub receipt: Option<ReceiptImage>,
}

impl SubmissionForm {
    /// Store a text field by its form name. Unknown names are ignored.
    pub fn set_text(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = Some(value),
            "phone" => self.phone = Some(value),
            "accountNumber" => self.account_number = Some(value),
            "bank" => self.bank = Some(value),
            _ => tracing::debug!(field, "Ignoring unknown form field"),
        }
    }

    /// Validate the collected fields.
    ///
    /// # Validation
    ///
    /// - `name`, `phone`, `accountNumber`, `bank`: required, trimmed, non-empty
    /// - `phone`: 10 or 11 digits once separators are stripped
    /// - `receipt`: required, non-empty, `image/*`, at most `max_bytes`
    pub fn validate(self, max_bytes: usize) -> Result<ReceiptSubmission, AppError> {
        let (Some(name), Some(phone), Some(account_number), Some(bank), Some(receipt)) = (
            non_blank(self.name),
            non_blank(self.phone),
            non_blank(self.account_number),
            non_blank(self.bank),
            self.receipt,
        ) else {
            return Err(AppError::InvalidRequest(MISSING_FIELDS.to_string()));
        };

        let phone = format_phone(&phone_digits(&phone))
            .ok_or_else(|| AppError::InvalidRequest(INVALID_PHONE.to_string()))?;

        receipt.validate(max_bytes)?;

        Ok(ReceiptSubmission {
            name,
            phone,
            account_number,
            bank,
            receipt,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A validated rebate claim.
#[derive(Debug, Clone)]
pub struct ReceiptSubmission {
    pub name: String,
    /// Hyphenated, e.g. `010-1234-5678`
    pub phone: String,
    pub account_number: String,
    pub bank: String,
    pub receipt: ReceiptImage,
}

impl ReceiptSubmission {
    /// The combined account cell written to the spreadsheet, e.g. `123456 (신한은행)`.
    pub fn account_label(&self) -> String {
        format!("{} ({})", self.account_number, self.bank)
    }
}

/// Response body for `POST /api/upload`.
///
/// # JSON Example
///
/// ```json
/// {
///   "success": true,
///   "message": "제출되었습니다.",
///   "imageUrl": "https://res.cloudinary.com/demo/image/upload/v1/mealpass-receipts/abc.jpg"
/// }
/// ```
///
/// `warning` (and in development `error`) appear only when the spreadsheet
/// append failed after the image was stored.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionResponse {
    pub fn submitted(image_url: String) -> Self {
        Self {
            success: true,
            message: SUBMITTED.to_string(),
            image_url,
            warning: None,
            error: None,
        }
    }

    /// Image stored, spreadsheet row missing.
    pub fn with_sheets_warning(mut self, error: Option<String>) -> Self {
        self.warning = Some(SHEETS_WARNING.to_string());
        self.error = error;
        self
    }
}

/// Strip everything but ASCII digits.
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Hyphenate a Korean phone number given as bare digits.
///
/// 11 digits become `XXX-XXXX-XXXX`, 10 digits `XXX-XXX-XXXX`.
/// Anything else is rejected.
pub fn format_phone(digits: &str) -> Option<String> {
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    match digits.len() {
        11 => Some(format!(
            "{}-{}-{}",
            &digits[..3],
            &digits[3..7],
            &digits[7..]
        )),
        10 => Some(format!(
            "{}-{}-{}",
            &digits[..3],
            &digits[3..6],
            &digits[6..]
        )),
        _ => None,
    }
}
