//! Peer registry: handshake state machine and peer bookkeeping.
//!
//! Origins move Unknown → Pending (on `hello`) → Trusted (on `acl:Accept`),
//! or are dropped on `acl:Reject`. A trusted peer is also dropped once its
//! connection reports closed. At most one peer per origin is tracked.
//!
//! Accept/Reject decisions are delegated to whichever trusted peer answers
//! the `acl:Request` first: the first answer consumes the pending entry, so
//! every later answer for the same origin is a no-op.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use playerlink_core::Outbound;
use serde_json::{Map, Value};

use crate::endpoint::Endpoint;
use crate::send_target::SendTarget;

/// Handshake state for an origin the registry knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// Said hello, waiting for a trusted peer to decide.
    Pending,
    /// Authorized to send commands and receive state.
    Trusted,
}

/// A peer endpoint together with the origin it speaks for.
#[derive(Clone)]
pub struct Peer {
    pub origin: String,
    pub endpoint: Arc<dyn Endpoint>,
}

impl fmt::Debug for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peer")
            .field("origin", &self.origin)
            .field("closed", &self.endpoint.is_closed())
            .finish()
    }
}

/// What a `hello` did to the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum HelloOutcome {
    /// Origin already pending or trusted; nothing changed.
    Ignored,
    /// Origin is now pending; this request went out to every trusted peer.
    Requested(Outbound),
    /// Origin is pre-trusted by config and was promoted straight away.
    Admitted,
    /// A trusted origin came back on a new connection after its old one
    /// closed. The new endpoint replaced the old one.
    Reconnected,
}

/// Pending and trusted peer tables, owned by the hub.
pub struct PeerRegistry {
    trusted: HashMap<String, Peer>,
    pending: HashMap<String, Peer>,
    pre_trusted: HashSet<String>,
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self {
            trusted: HashMap::new(),
            pending: HashMap::new(),
            pre_trusted: HashSet::new(),
        }
    }

    /// Apply config: origins that skip the accept round-trip.
    pub fn apply_config(&mut self, trusted_origins: &[String]) {
        for origin in trusted_origins {
            self.pre_trusted.insert(origin.clone());
            tracing::info!(origin = %origin, "pre-trusted origin from config");
        }
    }

    /// Trust a peer unconditionally. Used for the daemon's own origin.
    pub fn insert_trusted(&mut self, peer: Peer) {
        self.pending.remove(&peer.origin);
        self.trusted.insert(peer.origin.clone(), peer);
    }

    pub fn state(&self, origin: &str) -> Option<PeerState> {
        if self.trusted.contains_key(origin) {
            Some(PeerState::Trusted)
        } else if self.pending.contains_key(origin) {
            Some(PeerState::Pending)
        } else {
            None
        }
    }

    pub fn is_trusted(&self, origin: &str) -> bool {
        self.trusted.contains_key(origin)
    }

    /// Register a `hello` from an origin.
    ///
    /// Idempotent for origins already pending or trusted on a live
    /// connection. An entry whose connection has closed is replaced: a
    /// trusted origin keeps its trust on the new endpoint, a pending one
    /// asks again. Otherwise the origin becomes pending and an `acl:Request`
    /// carrying the hello payload goes to every trusted peer, unless config
    /// pre-trusts it.
    pub fn handle_hello(
        &mut self,
        origin: &str,
        endpoint: Arc<dyn Endpoint>,
        payload: Map<String, Value>,
    ) -> HelloOutcome {
        let peer = Peer {
            origin: origin.to_string(),
            endpoint,
        };

        if let Some(old) = self.trusted.get_mut(origin) {
            if !old.endpoint.is_closed() {
                return HelloOutcome::Ignored;
            }
            *old = peer;
            tracing::info!(origin, "trusted peer reconnected");
            return HelloOutcome::Reconnected;
        }

        if let Some(old) = self.pending.get(origin) {
            if !old.endpoint.is_closed() {
                return HelloOutcome::Ignored;
            }
            self.pending.remove(origin);
        }

        if self.pre_trusted.contains(origin) {
            self.trusted.insert(origin.to_string(), peer);
            tracing::info!(origin, "pre-trusted peer admitted");
            return HelloOutcome::Admitted;
        }

        self.pending.insert(origin.to_string(), peer);
        let request = Outbound::request(origin, payload);
        self.broadcast(&request);
        tracing::info!(origin, trusted = self.trusted.len(), "peer pending authorization");
        HelloOutcome::Requested(request)
    }

    /// Promote a pending origin. Returns the peer if this call promoted it,
    /// `None` for stale or duplicate answers.
    pub fn accept(&mut self, origin: &str) -> Option<Peer> {
        let peer = self.pending.remove(origin)?;
        self.trusted.insert(origin.to_string(), peer.clone());
        tracing::info!(origin, "peer accepted");
        Some(peer)
    }

    /// Drop a pending or trusted origin. A trusted peer is told it went
    /// offline before removal. Returns whether anything was removed.
    pub fn reject(&mut self, origin: &str) -> bool {
        let was_pending = self.pending.remove(origin).is_some();
        let was_trusted = match self.trusted.remove(origin) {
            Some(peer) => {
                peer.endpoint.post(&Outbound::Online { online: false });
                true
            }
            None => false,
        };
        if was_pending || was_trusted {
            tracing::info!(origin, was_trusted, "peer rejected");
        }
        was_pending || was_trusted
    }

    /// Send to every trusted peer.
    pub fn broadcast(&self, message: &Outbound) {
        for peer in self.trusted.values() {
            peer.endpoint.post(message);
        }
    }

    /// Send to a target. A `Peer` target that is not trusted is dropped.
    pub fn send(&self, target: &SendTarget, message: &Outbound) {
        match target {
            SendTarget::Broadcast => self.broadcast(message),
            SendTarget::Peer(origin) => {
                if let Some(peer) = self.trusted.get(origin) {
                    peer.endpoint.post(message);
                }
            }
        }
    }

    /// Remove peers whose connection has closed. No offline notice is sent
    /// since nobody is left to read it. Returns the removed trusted origins.
    pub fn sweep_closed(&mut self) -> Vec<String> {
        let mut gone = Vec::new();
        self.trusted.retain(|origin, peer| {
            let open = !peer.endpoint.is_closed();
            if !open {
                gone.push(origin.clone());
            }
            open
        });
        self.pending.retain(|_, peer| !peer.endpoint.is_closed());
        gone
    }

    /// Trusted origins, sorted.
    pub fn trusted_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = self.trusted.keys().cloned().collect();
        origins.sort();
        origins
    }

    /// Pending origins, sorted.
    pub fn pending_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = self.pending.keys().cloned().collect();
        origins.sort();
        origins
    }

    /// (trusted, pending)
    pub fn counts(&self) -> (usize, usize) {
        (self.trusted.len(), self.pending.len())
    }
}
