//! Reminder Log Routes

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::{daily_summary, DailySummary, LogRecord};
use tokio::sync::RwLock;

use crate::{ApiError, AppState};

/// Query parameters for the reminder history
#[derive(Debug, Deserialize)]
pub struct ReminderQuery {
    /// Maximum number of rows, newest first
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Only rows with this outcome ("ack" or "ignored")
    pub outcome: Option<String>,
}

fn default_limit() -> usize {
    50
}

/// Response for the reminder history
#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub data: Vec<LogRecord>,
    pub count: usize,
    pub acknowledged_count: usize,
}

/// Recent reminder rows
pub async fn get_reminders(
    State(state): State<Arc<RwLock<AppState>>>,
    Query(params): Query<ReminderQuery>,
) -> Json<ReminderResponse> {
    let state = state.read().await;
    let rows: Vec<LogRecord> = state
        .log
        .recent(usize::MAX)
        .into_iter()
        .filter(|r| params.outcome.as_deref().map_or(true, |o| r.outcome == o))
        .take(params.limit)
        .collect();

    let acknowledged = rows.iter().filter(|r| r.is_acknowledged()).count();
    Json(ReminderResponse {
        count: rows.len(),
        acknowledged_count: acknowledged,
        data: rows,
    })
}

/// Response for the per-day usage statistics
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub data: Vec<DailySummary>,
    pub days: usize,
}

/// Reminders and acknowledgment rate per calendar day
pub async fn get_summary(
    State(state): State<Arc<RwLock<AppState>>>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let state = state.read().await;
    let records = state.log.read_all()?;
    let data = daily_summary(&records);
    Ok(Json(SummaryResponse {
        days: data.len(),
        data,
    }))
}
