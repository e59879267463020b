//! /status and /peers handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use playerlink_core::Profile;
use playerlink_services::StateSnapshot;

use super::{snapshot, ApiState};

// ── /status ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    pub profile: Profile,
    pub online: bool,
    pub version: Option<String>,
    pub state: StateSnapshot,
    pub trusted: usize,
    pub pending: usize,
}

pub async fn handle_status(
    State(state): State<ApiState>,
) -> Result<Json<StatusResponse>, (StatusCode, String)> {
    let snap = snapshot(&state).await?;
    Ok(Json(StatusResponse {
        profile: snap.profile,
        online: snap.state.online.unwrap_or(false),
        version: snap.state.version.clone(),
        trusted: snap.trusted.len(),
        pending: snap.pending.len(),
        state: snap.state,
    }))
}

// ── /peers ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PeersResponse {
    pub local_origin: String,
    pub trusted: Vec<String>,
    pub pending: Vec<String>,
}

pub async fn handle_peers(
    State(state): State<ApiState>,
) -> Result<Json<PeersResponse>, (StatusCode, String)> {
    let snap = snapshot(&state).await?;
    Ok(Json(PeersResponse {
        local_origin: snap.local_origin,
        trusted: snap.trusted,
        pending: snap.pending,
    }))
}
