//! Storage Layer
//!
//! Append-only CSV log with one row per resolved reminder, plus per-day
//! usage statistics read back from it.

mod reminder_log;
mod summary;

pub use reminder_log::{format_timestamp, LogRecord, ReminderLog, LOG_HEADER};
pub use summary::{daily_summary, DailySummary};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
