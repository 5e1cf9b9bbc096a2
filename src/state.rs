//! Shared application state.

use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    cloudinary::{CloudinaryClient, CloudinaryError},
    sheets::{SheetsClient, SheetsError},
};

/// Handed to every handler through axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cloudinary: Arc<CloudinaryClient>,
    pub sheets: Arc<SheetsClient>,
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Cloudinary client: {0}")]
    Cloudinary(#[from] CloudinaryError),

    #[error("Google Sheets client: {0}")]
    Sheets(#[from] SheetsError),
}

impl AppState {
    /// Build the vendor clients from configuration.
    ///
    /// Fails fast on an unusable service account key so a misconfigured
    /// deployment never accepts submissions.
    pub fn new(config: Config) -> Result<Self, StateError> {
        let cloudinary = CloudinaryClient::new(&config)?;
        let sheets = SheetsClient::new(&config)?;

        Ok(Self {
            config: Arc::new(config),
            cloudinary: Arc::new(cloudinary),
            sheets: Arc::new(sheets),
        })
    }
}
