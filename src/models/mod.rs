//! Request and response models.
//!
//! Nothing here is persisted locally; the spreadsheet is the store of record.

/// Feedback attached to an earlier submission
pub mod feedback;
/// Receipt rebate submission
pub mod submission;
