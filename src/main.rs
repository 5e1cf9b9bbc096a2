//! Receipt rebate service - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Build the Cloudinary and Google Sheets clients
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port

use receipt_rebate_server::{config, router, state::AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!(
        app_env = ?config.app_env,
        project_id = %config.google_project_id,
        spreadsheet_id = %config.google_sheet_id,
        cloudinary_folder = %config.cloudinary_folder,
        "Configuration loaded"
    );

    let addr = format!("0.0.0.0:{}", config.server_port);

    // Vendor clients; an unusable service account key stops startup here
    let state = AppState::new(config)?;
    tracing::info!("Vendor clients ready");

    let app = router(state);

    // Bind to network address and start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
