//! Plain HTTP endpoints next to the WebSocket

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;
use crate::types::GamePhase;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub phase: GamePhase,
    pub players: usize,
    pub server_now: String,
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let songfest = state.songfest.read().await;
    Json(HealthResponse {
        status: "ok",
        phase: songfest.phase(),
        players: songfest.player_count(),
        server_now: chrono::Utc::now().to_rfc3339(),
    })
}
