//! Session Status Routes

use axum::{extract::State, Json};
use session::SessionSnapshot;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::AppState;

/// Latest published session snapshot
pub async fn get_status(State(state): State<Arc<RwLock<AppState>>>) -> Json<SessionSnapshot> {
    let state = state.read().await;
    let snapshot = state.snapshots.borrow().clone();
    Json(snapshot)
}
