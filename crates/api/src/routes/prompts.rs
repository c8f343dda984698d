//! Prompt Routes
//!
//! The pending prompt is read from the latest snapshot; answers are queued
//! on the session's command channel and applied on its next cycle.

use alerting::{AckOutcome, Prompt};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use session::SessionCommand;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{ApiError, AppState, CommandAccepted};

/// Response for the pending prompt list
#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub data: Vec<Prompt>,
    pub count: usize,
}

/// Prompts awaiting an answer (at most one)
pub async fn get_prompts(State(state): State<Arc<RwLock<AppState>>>) -> Json<PromptResponse> {
    let state = state.read().await;
    let data: Vec<Prompt> = state
        .snapshots
        .borrow()
        .pending_prompt
        .iter()
        .cloned()
        .collect();
    Json(PromptResponse {
        count: data.len(),
        data,
    })
}

/// Answer a prompt: acknowledged, ignored or snoozed
pub async fn answer_prompt(
    State(state): State<Arc<RwLock<AppState>>>,
    Path(id): Path<Uuid>,
    Json(outcome): Json<AckOutcome>,
) -> Result<(StatusCode, Json<CommandAccepted>), ApiError> {
    let state = state.read().await;
    let pending = state
        .snapshots
        .borrow()
        .pending_prompt
        .as_ref()
        .is_some_and(|p| p.id == id);
    if !pending {
        return Err(ApiError::NotFound(format!("No pending prompt with id {}", id)));
    }

    state
        .send(SessionCommand::Acknowledge { id, outcome })
        .await?;
    Ok((StatusCode::ACCEPTED, Json(CommandAccepted::new("acknowledge"))))
}
