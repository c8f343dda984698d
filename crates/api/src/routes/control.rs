//! Session Control Routes

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use session::SessionCommand;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{ApiError, AppState, CommandAccepted};

/// Body for a manual snooze
#[derive(Debug, Deserialize)]
pub struct SnoozeRequest {
    /// Defaults to the configured snooze length
    pub duration_secs: Option<f64>,
}

/// Body for a calibration label
#[derive(Debug, Deserialize)]
pub struct CalibrationRequest {
    /// Whether the user feels stressed right now
    pub stressed: bool,
}

type Accepted = (StatusCode, Json<CommandAccepted>);

pub async fn snooze(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(request): Json<SnoozeRequest>,
) -> Result<Accepted, ApiError> {
    let state = state.read().await;
    let duration_secs = request.duration_secs.unwrap_or(state.snooze_secs);
    state.send(SessionCommand::Snooze { duration_secs }).await?;
    Ok((StatusCode::ACCEPTED, Json(CommandAccepted::new("snooze"))))
}

/// Label the current facial features for classifier calibration
pub async fn calibrate(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(request): Json<CalibrationRequest>,
) -> Result<Accepted, ApiError> {
    let state = state.read().await;
    state
        .send(SessionCommand::Calibrate {
            stressed: request.stressed,
        })
        .await?;
    Ok((StatusCode::ACCEPTED, Json(CommandAccepted::new("calibrate"))))
}

pub async fn stop(State(state): State<Arc<RwLock<AppState>>>) -> Result<Accepted, ApiError> {
    let state = state.read().await;
    state.send(SessionCommand::Stop).await?;
    Ok((StatusCode::ACCEPTED, Json(CommandAccepted::new("stop"))))
}
