//! Daily usage statistics

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::reminder_log::LogRecord;

/// Reminder totals for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// YYYY-MM-DD
    pub date: String,
    pub total: u32,
    pub acknowledged: u32,
    /// Percent of reminders acknowledged
    pub ack_rate: f64,
}

/// Group log rows by date, oldest day first
pub fn daily_summary(records: &[LogRecord]) -> Vec<DailySummary> {
    let mut days: BTreeMap<String, (u32, u32)> = BTreeMap::new();

    for record in records {
        let date = match NaiveDateTime::parse_from_str(&record.timestamp, "%Y-%m-%dT%H:%M:%S") {
            Ok(dt) => dt.date().format("%Y-%m-%d").to_string(),
            Err(e) => {
                warn!("Unparseable log timestamp {:?}: {}", record.timestamp, e);
                continue;
            }
        };
        let entry = days.entry(date).or_insert((0, 0));
        entry.0 += 1;
        if record.is_acknowledged() {
            entry.1 += 1;
        }
    }

    days.into_iter()
        .map(|(date, (total, acknowledged))| DailySummary {
            date,
            total,
            acknowledged,
            ack_rate: acknowledged as f64 / total as f64 * 100.0,
        })
        .collect()
}
