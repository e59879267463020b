//! /ws: one WebSocket per peer context.
//!
//! The request's `Origin` header is the peer identity. Frames in both
//! directions are the JSON tagged messages; anything that does not decode
//! is dropped without a reply.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};

use playerlink_core::{Inbound, Outbound};
use playerlink_services::{ChannelEndpoint, Endpoint, HubHandle};

use super::ApiState;

pub async fn handle_ws(
    State(state): State<ApiState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(origin) = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
    else {
        return (StatusCode::BAD_REQUEST, "missing Origin header").into_response();
    };

    ws.on_upgrade(move |socket| connection(state.hub, origin, socket))
}

async fn connection(hub: HubHandle, origin: String, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (endpoint, mut outbound) = ChannelEndpoint::new();
    endpoint.post(&Outbound::Ready { sview: true });
    let endpoint: Arc<dyn Endpoint> = endpoint;

    tracing::debug!(origin = %origin, "peer connected");

    let writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let Ok(text) = serde_json::to_string(&message) else {
                continue;
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = stream.next().await {
        let Message::Text(text) = frame else {
            continue;
        };
        let Ok(message) = serde_json::from_str::<Inbound>(text.as_str()) else {
            continue;
        };
        tracing::trace!(origin = %origin, tag = message.tag(), "inbound message");
        hub.deliver(origin.clone(), endpoint.clone(), message);
    }

    // Once the writer is gone its receiver is dropped and the endpoint
    // reports closed, to the sweep and to a reconnecting hello.
    writer.abort();
    let _ = writer.await;
    tracing::debug!(origin = %origin, "peer disconnected");
}
