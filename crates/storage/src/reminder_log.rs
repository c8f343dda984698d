//! Reminder log

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::StorageError;

pub const LOG_HEADER: [&str; 7] = [
    "timestamp",
    "trigger_name",
    "outcome",
    "blinks_last_min",
    "stress_level",
    "heart_rate",
    "drowsiness_score",
];

/// ISO-8601 local time to the second for epoch seconds
pub fn format_timestamp(epoch_secs: f64) -> Result<String, StorageError> {
    let secs = epoch_secs.floor() as i64;
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        .ok_or_else(|| StorageError::InvalidTimestamp(epoch_secs.to_string()))
}

/// One resolved reminder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub trigger_name: String,
    /// "ack" or "ignored"
    pub outcome: String,
    pub blinks_last_min: u32,
    pub stress_level: u32,
    pub heart_rate: u32,
    pub drowsiness_score: u32,
}

impl LogRecord {
    pub fn is_acknowledged(&self) -> bool {
        self.outcome == "ack"
    }
}

/// CSV-backed reminder log with a bounded in-memory tail
pub struct ReminderLog {
    path: PathBuf,
    recent: Mutex<VecDeque<LogRecord>>,
    max_recent: usize,
}

impl ReminderLog {
    /// Open (creating with a header row if needed) the log at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let needs_header = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        if needs_header {
            let mut writer = csv::Writer::from_path(&path)?;
            writer.write_record(LOG_HEADER)?;
            writer.flush()?;
            info!("Created reminder log at {}", path.display());
        }

        let log = Self {
            path,
            recent: Mutex::new(VecDeque::new()),
            max_recent: 200,
        };

        // Warm the tail cache from disk
        let existing = log.read_all()?;
        if let Ok(mut recent) = log.recent.lock() {
            let skip = existing.len().saturating_sub(log.max_recent);
            recent.extend(existing.into_iter().skip(skip));
        }
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row
    pub fn append(&self, record: &LogRecord) -> Result<(), StorageError> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        debug!("Logged {} -> {}", record.trigger_name, record.outcome);

        if let Ok(mut recent) = self.recent.lock() {
            if recent.len() >= self.max_recent {
                recent.pop_front();
            }
            recent.push_back(record.clone());
        }
        Ok(())
    }

    /// Every row on disk; malformed rows are skipped.
    ///
    /// Columns are read by position. Rows missing the trailing optional
    /// columns (older four-column logs included) read them as 0.
    pub fn read_all(&self) -> Result<Vec<LogRecord>, StorageError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.records() {
            let mut row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping unreadable log row: {}", e);
                    continue;
                }
            };
            row.truncate(LOG_HEADER.len());
            for _ in row.len()..LOG_HEADER.len() {
                row.push_field("0");
            }
            match row.deserialize::<LogRecord>(None) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping malformed log row: {}", e),
            }
        }
        Ok(records)
    }

    /// Up to `limit` latest rows, newest first
    pub fn recent(&self, limit: usize) -> Vec<LogRecord> {
        self.recent
            .lock()
            .map(|r| r.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }
}
