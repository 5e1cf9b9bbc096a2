//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (multipart form, JSON body)
//! 2. Validates it and calls the vendor services
//! 3. Returns HTTP response (JSON, status code)

/// `POST /api/feedback`
pub mod feedback;
/// `GET /health`
pub mod health;
/// `GET /`
pub mod page;
/// `POST /api/upload`
pub mod submissions;
