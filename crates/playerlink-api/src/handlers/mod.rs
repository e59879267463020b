//! HTTP handlers: control API over the hub, and the peer WebSocket.

pub mod acl;
pub mod status;
pub mod ws;

use axum::http::StatusCode;

use playerlink_services::{HubHandle, HubSnapshot};

#[derive(Clone)]
pub struct ApiState {
    pub hub: HubHandle,
}

// ── Shared helpers ────────────────────────────────────────────────────────────

fn hub_gone() -> (StatusCode, String) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "hub is not running".to_string(),
    )
}

async fn snapshot(state: &ApiState) -> Result<HubSnapshot, (StatusCode, String)> {
    state.hub.snapshot().await.ok_or_else(hub_gone)
}

// Re-export handler functions for use in router setup.
pub use acl::{handle_acl_accept, handle_acl_reject};
pub use status::{handle_peers, handle_status};
pub use ws::handle_ws;
