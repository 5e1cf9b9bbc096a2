//! Receipt rebate service.
//!
//! A small web service for a neighbourhood cash-back promotion: diners upload
//! a photo of their receipt with their name, phone and bank account, and the
//! claim is recorded in a Google Sheet. The receipt image is stored in
//! Cloudinary. A second endpoint attaches feedback to an earlier claim by
//! phone number.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Storage of record**: Google Sheets v4 REST API (service account)
//! - **Image hosting**: Cloudinary signed uploads
//! - **Format**: multipart/JSON requests, JSON responses

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Room for the text fields and multipart framing on top of the image limit.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the HTTP router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(handlers::page::index))
        .route("/health", get(handlers::health::health_check))
        .route("/api/upload", post(handlers::submissions::submit_receipt))
        .route("/api/feedback", post(handlers::feedback::submit_feedback))
        // Axum's 2 MB default is below the receipt limit
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
