//! /acl handlers: the daemon answers handshake requests as its own origin.
//!
//! Answers race with every other trusted peer; whichever reaches the hub
//! first decides, and `applied` is false for the loser.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use playerlink_core::Inbound;

use super::{hub_gone, ApiState};

#[derive(Deserialize)]
pub struct AclRequest {
    pub origin: String,
}

#[derive(Serialize)]
pub struct AclResponse {
    pub origin: String,
    pub applied: bool,
}

// ── /acl/accept (POST) ───────────────────────────────────────────────────────

pub async fn handle_acl_accept(
    State(state): State<ApiState>,
    Json(req): Json<AclRequest>,
) -> Result<Json<AclResponse>, (StatusCode, String)> {
    let message = Inbound::Accept {
        origin: req.origin.clone(),
    };
    answer(&state, message, req.origin).await
}

// ── /acl/reject (POST) ───────────────────────────────────────────────────────

pub async fn handle_acl_reject(
    State(state): State<ApiState>,
    Json(req): Json<AclRequest>,
) -> Result<Json<AclResponse>, (StatusCode, String)> {
    let message = Inbound::Reject {
        origin: req.origin.clone(),
    };
    answer(&state, message, req.origin).await
}

async fn answer(
    state: &ApiState,
    message: Inbound,
    origin: String,
) -> Result<Json<AclResponse>, (StatusCode, String)> {
    if origin.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "origin must not be empty".to_string()));
    }
    let applied = state.hub.local(message).await.ok_or_else(hub_gone)?;
    Ok(Json(AclResponse { origin, applied }))
}
