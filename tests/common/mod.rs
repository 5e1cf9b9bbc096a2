#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use httpmock::prelude::*;
use receipt_rebate_server::{
    config::{AppEnv, Config, SignatureAlgorithm},
    router,
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const SHEET_ID: &str = "sheet-123";
pub const ACCESS_TOKEN: &str = "ya29.test-token";
pub const BOUNDARY: &str = "----rebate-test-boundary";
pub const IMAGE_URL: &str =
    "https://res.cloudinary.com/demo/image/upload/v1/mealpass-receipts/abc.jpg";

const TEST_KEY: &str = include_str!("../fixtures/service_account_key.pem");

/// Configuration pointing every vendor at the mock server.
pub fn test_config(server: &MockServer) -> Config {
    Config {
        server_port: 0,
        app_env: AppEnv::Production,
        max_upload_bytes: 5 * 1024 * 1024,
        cloudinary_cloud_name: "demo".to_string(),
        cloudinary_api_key: "cloud-key".to_string(),
        cloudinary_api_secret: "cloud-secret".to_string(),
        cloudinary_folder: "mealpass-receipts".to_string(),
        cloudinary_signature_algorithm: SignatureAlgorithm::Sha1,
        cloudinary_api_base: server.base_url(),
        google_service_account_email: "rebate@test-project.iam.gserviceaccount.com".to_string(),
        // Stored the way hosting dashboards keep it: one line, escaped newlines
        google_private_key: TEST_KEY.replace('\n', "\\n"),
        google_project_id: "test-project".to_string(),
        google_sheet_id: SHEET_ID.to_string(),
        google_sheet_name: "Sheet1".to_string(),
        google_sheets_api_base: server.base_url(),
        google_token_uri: server.url("/token"),
    }
}

pub fn app(config: Config) -> Router {
    router(AppState::new(config).expect("test state builds"))
}

pub async fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/token")
                .body_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer");
            then.status(200).json_body(json!({
                "access_token": ACCESS_TOKEN,
                "expires_in": 3599,
                "token_type": "Bearer"
            }));
        })
        .await
}

pub async fn mock_cloudinary_ok(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1_1/demo/auto/upload")
                .body_contains("api_key=cloud-key")
                .body_contains("folder=mealpass-receipts")
                .body_contains("file=data%3Aimage%2Fjpeg%3Bbase64%2C");
            then.status(200).json_body(json!({
                "secure_url": IMAGE_URL,
                "public_id": "mealpass-receipts/abc",
                "resource_type": "image"
            }));
        })
        .await
}

/// A complete, valid set of text fields.
pub fn valid_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "홍길동"),
        ("phone", "010-1234-5678"),
        ("accountNumber", "1234567890"),
        ("bank", "신한은행"),
    ]
}

/// Hand-built multipart body.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"receipt\"; filename=\"receipt.jpg\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn feedback_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/feedback")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response: Response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
