//! Cloudinary upload client.
//!
//! Receipts are sent to the signed upload endpoint as a base64 data URI:
//!
//! `POST {api_base}/v1_1/{cloud_name}/auto/upload`
//!
//! # Signing
//!
//! Every parameter except `file`, `api_key`, `resource_type` and `cloud_name`
//! is sorted by name, joined as `k=v&k=v`, suffixed with the API secret and
//! digested (SHA-1 by default, SHA-256 if the account is configured for it).

use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::config::{Config, SignatureAlgorithm};
use crate::models::submission::ReceiptImage;

#[derive(Debug, thiserror::Error)]
pub enum CloudinaryError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cloudinary returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Result of a successful upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    pub secure_url: String,
    pub public_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

pub struct CloudinaryClient {
    http: reqwest::Client,
    upload_url: String,
    api_key: String,
    api_secret: String,
    folder: String,
    algorithm: SignatureAlgorithm,
}

impl CloudinaryClient {
    pub fn new(config: &Config) -> Result<Self, CloudinaryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            upload_url: format!(
                "{}/v1_1/{}/auto/upload",
                config.cloudinary_api_base.trim_end_matches('/'),
                config.cloudinary_cloud_name
            ),
            api_key: config.cloudinary_api_key.clone(),
            api_secret: config.cloudinary_api_secret.clone(),
            folder: config.cloudinary_folder.clone(),
            algorithm: config.cloudinary_signature_algorithm,
        })
    }

    /// Upload a receipt image into the configured folder.
    pub async fn upload(&self, image: &ReceiptImage) -> Result<UploadedImage, CloudinaryError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signed = [("folder", self.folder.as_str()), ("timestamp", timestamp.as_str())];
        let signature = sign(&signed, &self.api_secret, self.algorithm);

        let mut form: Vec<(&str, String)> = vec![
            ("file", data_uri(image)),
            ("api_key", self.api_key.clone()),
            ("signature", signature),
        ];
        if self.algorithm == SignatureAlgorithm::Sha256 {
            form.push(("signature_algorithm", "sha256".to_string()));
        }
        form.extend(signed.iter().map(|(k, v)| (*k, v.to_string())));

        let response = self.http.post(&self.upload_url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(CloudinaryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<UploadedImage>().await?)
    }
}

/// Encode the image as `data:<mime>;base64,<payload>`.
fn data_uri(image: &ReceiptImage) -> String {
    format!(
        "data:{};base64,{}",
        image.content_type,
        STANDARD.encode(&image.bytes)
    )
}

/// Compute the request signature over the given parameters.
pub fn sign(params: &[(&str, &str)], api_secret: &str, algorithm: SignatureAlgorithm) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by_key(|(k, _)| *k);

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let payload = format!("{to_sign}{api_secret}");

    match algorithm {
        SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    #[test]
    fn signature_matches_known_sha1_digest() {
        let params = [("timestamp", "1700000000"), ("folder", "mealpass-receipts")];

        assert_eq!(
            sign(&params, "secret", SignatureAlgorithm::Sha1),
            "04e3134bbe5e1f095cc0b33cff07001a200c55b9"
        );
    }

    #[test]
    fn signature_matches_known_sha256_digest() {
        let params = [("folder", "mealpass-receipts"), ("timestamp", "1700000000")];

        assert_eq!(
            sign(&params, "secret", SignatureAlgorithm::Sha256),
            "8a788f64c921816761488dc42c70bd6c186d3c126824de07336d377fd671fb67"
        );
    }

    #[test]
    fn empty_params_are_not_signed() {
        let with_empty = [
            ("folder", "mealpass-receipts"),
            ("tags", ""),
            ("timestamp", "1700000000"),
        ];

        assert_eq!(
            sign(&with_empty, "secret", SignatureAlgorithm::Sha1),
            "04e3134bbe5e1f095cc0b33cff07001a200c55b9"
        );
    }

    #[test]
    fn data_uri_carries_mime_type() {
        let image = ReceiptImage {
            file_name: None,
            content_type: "image/png".to_string(),
            bytes: Bytes::from_static(b"abc"),
        };

        assert_eq!(data_uri(&image), "data:image/png;base64,YWJj");
    }
}
