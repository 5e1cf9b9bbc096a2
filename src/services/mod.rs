//! Vendor integrations.
//!
//! Cloudinary stores receipt images; Google Sheets is the store of record
//! for submissions and feedback.

pub mod cloudinary;
pub mod google_auth;
pub mod sheets;
