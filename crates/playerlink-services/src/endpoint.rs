//! Message sinks for peers.
//!
//! Delivery is fire-and-forget: posting to an endpoint whose connection is
//! gone is silently dropped.

use std::sync::Arc;

use playerlink_core::Outbound;
use tokio::sync::mpsc;

/// An opaque outbound message sink owned by one peer connection.
pub trait Endpoint: Send + Sync {
    /// Queue a message for the peer. Never fails.
    fn post(&self, message: &Outbound);

    /// Whether the underlying connection has been torn down.
    fn is_closed(&self) -> bool;
}

/// Endpoint backed by an unbounded channel drained by a connection writer.
pub struct ChannelEndpoint {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ChannelEndpoint {
    /// Create an endpoint and the receiver its connection writer drains.
    /// Dropping the receiver marks the endpoint closed.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl Endpoint for ChannelEndpoint {
    fn post(&self, message: &Outbound) {
        let _ = self.tx.send(message.clone());
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// The daemon's own endpoint. It has no connection behind it; what it
/// receives is only traced.
pub struct LocalEndpoint;

impl Endpoint for LocalEndpoint {
    fn post(&self, message: &Outbound) {
        tracing::debug!(?message, "local peer notified");
    }

    fn is_closed(&self) -> bool {
        false
    }
}
