//! The rebate form page.

use axum::{extract::State, response::Html};

use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Serve the landing page, form and success/feedback steps.
///
/// The steps are switched client-side; the page talks to `/api/upload`
/// and `/api/feedback`. The size check in the browser uses the same
/// `MAX_UPLOAD_BYTES` as the server.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(state.config.max_upload_bytes))
}

fn render_index(max_upload_bytes: usize) -> String {
    INDEX_HTML
        .replace("__MAX_UPLOAD_BYTES__", &max_upload_bytes.to_string())
        .replace(
            "__MAX_UPLOAD_MB__",
            &(max_upload_bytes / (1024 * 1024)).to_string(),
        )
}
