//! Google Sheets client for the submission log.
//!
//! The sheet is an append-only log with one row per submission:
//!
//! | A | B | C | D | E | F | G |
//! |---|---|---|---|---|---|---|
//! | timestamp | name | phone | account (bank) | image URL | feedback | unmatched feedback |
//!
//! Feedback is matched to a submission by scanning column C from the bottom
//! for the same phone digits. Nothing here is transactional: two concurrent
//! feedback writes for the same phone simply race, and the last one wins.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use crate::config::Config;
use crate::models::feedback::Feedback;
use crate::models::submission::{ReceiptSubmission, format_phone, phone_digits};
use crate::services::google_auth::ServiceAccountAuth;

const KST_OFFSET_SECS: i32 = 9 * 3600;
const SUBMISSION_COLUMNS: &str = "A:E";
const PHONE_COLUMN: &str = "C";
const FEEDBACK_COLUMN: &str = "F";
const ALL_COLUMNS: &str = "A:G";

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("GOOGLE_PRIVATE_KEY is not a PEM private key; keep the \\n line breaks")]
    InvalidKey,

    #[error("invalid service account key: {0}")]
    Key(#[from] jsonwebtoken::errors::Error),

    #[error("invalid Sheets API base URL: {0}")]
    BaseUrl(String),

    #[error("token request failed with {status}: {message}")]
    Auth { status: u16, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Where a piece of feedback ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackPlacement {
    /// Written into column F of this (1-based) row.
    Matched { row: usize },
    /// No submission with that phone; appended as a new row with column G set.
    Appended,
}

/// One submission row, in column order.
#[derive(Debug, Clone)]
pub struct SubmissionRow {
    pub timestamp: String,
    pub name: String,
    pub phone: String,
    pub account: String,
    pub image_url: String,
}

impl SubmissionRow {
    pub fn new(submission: &ReceiptSubmission, image_url: &str, timestamp: String) -> Self {
        Self {
            timestamp,
            name: submission.name.clone(),
            phone: submission.phone.clone(),
            account: submission.account_label(),
            image_url: image_url.to_string(),
        }
    }

    fn into_values(self) -> Vec<String> {
        vec![
            self.timestamp,
            self.name,
            self.phone,
            self.account,
            self.image_url,
        ]
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

pub struct SheetsClient {
    http: reqwest::Client,
    auth: ServiceAccountAuth,
    api_base: Url,
    spreadsheet_id: String,
    sheet_name: String,
}

impl SheetsClient {
    pub fn new(config: &Config) -> Result<Self, SheetsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        let api_base = Url::parse(&config.google_sheets_api_base)
            .map_err(|e| SheetsError::BaseUrl(e.to_string()))?;

        Ok(Self {
            auth: ServiceAccountAuth::new(config, http.clone())?,
            http,
            api_base,
            spreadsheet_id: config.google_sheet_id.clone(),
            sheet_name: config.google_sheet_name.clone(),
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Append a submission to columns A:E.
    pub async fn append_submission(&self, row: SubmissionRow) -> Result<(), SheetsError> {
        tracing::debug!(spreadsheet_id = %self.spreadsheet_id, phone = %row.phone, "Appending submission row");

        self.append(SUBMISSION_COLUMNS, row.into_values()).await
    }

    /// Attach feedback to the latest submission with the same phone number.
    ///
    /// Falls back to appending `[timestamp, "", phone, "", "", "", feedback]`
    /// when no row matches.
    pub async fn save_feedback(
        &self,
        feedback: &Feedback,
        timestamp: String,
    ) -> Result<FeedbackPlacement, SheetsError> {
        let phones = self.read_phone_column().await?;

        match find_latest_row(&phones, &feedback.phone) {
            Some(row) => {
                let range = format!("{}!{FEEDBACK_COLUMN}{row}", self.sheet_name);
                let url = self.values_url(&range)?;

                let response = self
                    .http
                    .put(url)
                    .bearer_auth(self.auth.access_token().await?)
                    .query(&[("valueInputOption", "USER_ENTERED")])
                    .json(&json!({ "range": range, "values": [[feedback.text]] }))
                    .send()
                    .await?;
                check(response).await?;

                Ok(FeedbackPlacement::Matched { row })
            }
            None => {
                let values = vec![
                    timestamp,
                    String::new(),
                    display_phone(&feedback.phone),
                    String::new(),
                    String::new(),
                    String::new(),
                    feedback.text.clone(),
                ];
                self.append(ALL_COLUMNS, values).await?;

                Ok(FeedbackPlacement::Appended)
            }
        }
    }

    async fn read_phone_column(&self) -> Result<Vec<Vec<Value>>, SheetsError> {
        let range = format!("{}!{PHONE_COLUMN}:{PHONE_COLUMN}", self.sheet_name);
        let url = self.values_url(&range)?;

        let response = self
            .http
            .get(url)
            .bearer_auth(self.auth.access_token().await?)
            .send()
            .await?;
        let body: ValueRange = check(response).await?.json().await?;

        Ok(body.values)
    }

    async fn append(&self, columns: &str, values: Vec<String>) -> Result<(), SheetsError> {
        let range = format!("{}!{columns}", self.sheet_name);
        let url = self.values_url(&format!("{range}:append"))?;

        let response = self
            .http
            .post(url)
            .bearer_auth(self.auth.access_token().await?)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({ "values": [values] }))
            .send()
            .await?;
        check(response).await?;

        Ok(())
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}`
    fn values_url(&self, range: &str) -> Result<Url, SheetsError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::BaseUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);

        Ok(url)
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);

    Err(SheetsError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Find the bottom-most row whose phone cell has the same digits as `phone`.
///
/// `rows` is the phone column as returned by the API; rows are 1-based.
pub fn find_latest_row(rows: &[Vec<Value>], phone: &str) -> Option<usize> {
    let wanted = phone_digits(phone);
    if wanted.is_empty() {
        return None;
    }

    rows.iter()
        .enumerate()
        .rev()
        .find(|(_, row)| {
            row.first()
                .map(|cell| match cell {
                    Value::String(s) => phone_digits(s),
                    other => phone_digits(&other.to_string()),
                })
                .is_some_and(|digits| digits == wanted)
        })
        .map(|(index, _)| index + 1)
}

/// Hyphenate a phone the way submission rows store it; anything that is not
/// a 10 or 11 digit number is kept as typed.
fn display_phone(phone: &str) -> String {
    format_phone(&phone_digits(phone)).unwrap_or_else(|| phone.to_string())
}

/// Render a timestamp as Seoul wall-clock time in `ko-KR` style,
/// e.g. `2025. 03. 07. 오후 02:05:09`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    let kst = FixedOffset::east_opt(KST_OFFSET_SECS).expect("KST offset is in range");
    let local = at.with_timezone(&kst);
    let (is_pm, hour) = local.hour12();

    format!(
        "{} {} {:02}:{:02}:{:02}",
        local.format("%Y. %m. %d."),
        if is_pm { "오후" } else { "오전" },
        hour,
        local.minute(),
        local.second()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn column(cells: &[&str]) -> Vec<Vec<Value>> {
        cells
            .iter()
            .map(|c| {
                if c.is_empty() {
                    vec![]
                } else {
                    vec![Value::String(c.to_string())]
                }
            })
            .collect()
    }

    #[test]
    fn latest_matching_row_wins() {
        let rows = column(&[
            "전화번호",
            "010-1111-2222",
            "010-3333-4444",
            "",
            "010-1111-2222",
        ]);

        assert_eq!(find_latest_row(&rows, "01011112222"), Some(5));
        assert_eq!(find_latest_row(&rows, "010 3333 4444"), Some(3));
    }

    #[test]
    fn unmatched_phone_finds_nothing() {
        let rows = column(&["전화번호", "010-1111-2222"]);

        assert_eq!(find_latest_row(&rows, "010-9999-9999"), None);
    }

    #[test]
    fn phone_without_digits_never_matches_header() {
        let rows = column(&["phone", ""]);

        assert_eq!(find_latest_row(&rows, "unknown"), None);
    }

    #[test]
    fn numeric_cells_are_compared_by_digits() {
        let rows = vec![vec![json!(1011112222u64)]];

        assert_eq!(find_latest_row(&rows, "1011112222"), Some(1));
    }

    #[test]
    fn fallback_phone_matches_submission_format() {
        assert_eq!(display_phone("01055556666"), "010-5555-6666");
        assert_eq!(display_phone("010 555 6666"), "010-555-6666");
        assert_eq!(display_phone("010-5555-6666"), "010-5555-6666");
        assert_eq!(display_phone("+82 10"), "+82 10");
    }

    #[test]
    fn timestamp_is_seoul_time() {
        let afternoon = Utc.with_ymd_and_hms(2025, 3, 7, 5, 5, 9).unwrap();
        assert_eq!(format_timestamp(afternoon), "2025. 03. 07. 오후 02:05:09");

        let after_midnight = Utc.with_ymd_and_hms(2025, 12, 31, 15, 30, 0).unwrap();
        assert_eq!(format_timestamp(after_midnight), "2026. 01. 01. 오전 12:30:00");
    }
}
