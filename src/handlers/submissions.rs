//! Receipt submission handler.
//!
//! `POST /api/upload` takes a multipart form, stores the receipt image in
//! Cloudinary and appends a row to the spreadsheet.

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    error::{AppError, DetailedError, IMAGE_UPLOAD_FAILED},
    models::submission::{ReceiptImage, SubmissionForm, SubmissionResponse},
    services::sheets::{SubmissionRow, format_timestamp},
    state::AppState,
};

const RECEIPT_FIELD: &str = "receipt";

/// Submit a rebate claim.
///
/// # Request
///
/// `multipart/form-data` with `name`, `phone`, `accountNumber`, `bank`
/// and a `receipt` image file.
///
/// # Response
///
/// - **200**: `{ "success": true, "message": "제출되었습니다.", "imageUrl": "..." }`
/// - **200 with `warning`**: image stored but the spreadsheet append failed
/// - **400**: missing field, bad phone, non-image file
/// - **413**: receipt larger than `MAX_UPLOAD_BYTES`
/// - **500**: unreadable form, Cloudinary upload failed
pub async fn submit_receipt(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmissionResponse>, DetailedError> {
    let expose = state.config.expose_error_details();
    let limit = state.config.max_upload_bytes;

    let mut multipart = multipart.map_err(|e| {
        tracing::warn!(error = %e.body_text(), "Rejected upload body");
        AppError::UnreadableBody {
            message: IMAGE_UPLOAD_FAILED,
            reason: e.body_text(),
        }
        .with_details(expose)
    })?;
    let form = read_form(&mut multipart, limit)
        .await
        .map_err(|e| e.with_details(expose))?;
    let submission = form.validate(limit)?;

    let uploaded = state
        .cloudinary
        .upload(&submission.receipt)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, phone = %submission.phone, "Receipt upload failed");
            AppError::from(e).with_details(expose)
        })?;

    let timestamp = format_timestamp(Utc::now());
    let row = SubmissionRow::new(&submission, &uploaded.secure_url, timestamp.clone());
    let response = SubmissionResponse::submitted(uploaded.secure_url.clone());

    if let Err(e) = state.sheets.append_submission(row).await {
        tracing::error!(
            error = %e,
            phone = %submission.phone,
            image_url = %uploaded.secure_url,
            "Spreadsheet append failed; image is stored"
        );
        let detail = expose.then(|| e.to_string());
        return Ok(Json(response.with_sheets_warning(detail)));
    }

    tracing::info!(
        name = %submission.name,
        phone = %submission.phone,
        bank = %submission.bank,
        image_url = %uploaded.secure_url,
        public_id = %uploaded.public_id,
        file_name = submission.receipt.file_name.as_deref().unwrap_or("-"),
        timestamp = %timestamp,
        "Receipt submission recorded"
    );

    Ok(Json(response))
}

/// Collect the multipart fields into a [`SubmissionForm`].
async fn read_form(multipart: &mut Multipart, limit: usize) -> Result<SubmissionForm, AppError> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == RECEIPT_FIELD {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;

            form.receipt = Some(ReceiptImage {
                file_name,
                content_type,
                bytes,
            });
        } else {
            let value = field.text().await.map_err(|e| multipart_error(e, limit))?;
            form.set_text(&name, value);
        }
    }

    Ok(form)
}

/// Body-limit overruns surface as multipart errors with a 413 status.
fn multipart_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge { limit }
    } else {
        tracing::warn!(error = %err.body_text(), "Malformed multipart body");
        AppError::UnreadableBody {
            message: IMAGE_UPLOAD_FAILED,
            reason: err.body_text(),
        }
    }
}
