//! The hub: single owner of the peer registry and the state store.
//!
//! Every protocol event (inbound message, poll tick, liveness tick, backend
//! completion, API query) goes through one channel and runs to completion
//! before the next one. Backend calls run in spawned tasks and report back
//! as events, so they are the only points where other events interleave.

use std::sync::Arc;
use std::time::Duration;

use playerlink_core::config::PlayerlinkConfig;
use playerlink_core::{Inbound, Profile, Query, StatusRecord};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};

use crate::backend::{Backend, BackendError};
use crate::dispatch;
use crate::endpoint::{Endpoint, LocalEndpoint};
use crate::poll::{PollScheduler, PollTick};
use crate::registry::{HelloOutcome, Peer, PeerRegistry};
use crate::send_target::SendTarget;
use crate::slot::SlotUpdate;
use crate::store::{BackendWriter, Effect, StateSnapshot, StateStore};

pub(crate) enum HubEvent {
    Inbound {
        origin: String,
        endpoint: Arc<dyn Endpoint>,
        message: Inbound,
    },
    /// A message from the daemon's own trusted origin.
    Local {
        message: Inbound,
        reply: oneshot::Sender<bool>,
    },
    Status(Result<String, BackendError>),
    Title {
        generation: u64,
        result: Result<String, BackendError>,
    },
    Playlist {
        generation: u64,
        result: Result<String, BackendError>,
    },
    Snapshot(oneshot::Sender<HubSnapshot>),
}

/// Point-in-time view for the control API.
#[derive(Debug, Clone, Serialize)]
pub struct HubSnapshot {
    pub profile: Profile,
    pub local_origin: String,
    pub state: StateSnapshot,
    pub trusted: Vec<String>,
    pub pending: Vec<String>,
}

/// Cloneable sender side of the hub.
#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubEvent>,
}

impl HubHandle {
    /// Hand an inbound message from `origin` to the hub. Never blocks.
    pub fn deliver(&self, origin: impl Into<String>, endpoint: Arc<dyn Endpoint>, message: Inbound) {
        let _ = self.tx.send(HubEvent::Inbound {
            origin: origin.into(),
            endpoint,
            message,
        });
    }

    /// Send a message as the daemon's own origin. Returns whether it took
    /// effect, or `None` if the hub is gone.
    pub async fn local(&self, message: Inbound) -> Option<bool> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(HubEvent::Local { message, reply }).ok()?;
        rx.await.ok()
    }

    pub async fn snapshot(&self) -> Option<HubSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(HubEvent::Snapshot(reply)).ok()?;
        rx.await.ok()
    }
}

enum Step {
    Event(HubEvent),
    Poll,
    Sweep,
    Shutdown,
}

pub struct Hub<B: Backend> {
    backend: Arc<B>,
    registry: PeerRegistry,
    store: StateStore,
    writer: BackendWriter,
    scheduler: PollScheduler,
    ticks: mpsc::UnboundedReceiver<PollTick>,
    events_tx: mpsc::UnboundedSender<HubEvent>,
    events_rx: mpsc::UnboundedReceiver<HubEvent>,
    local: Peer,
    liveness_interval: Duration,
}

impl<B: Backend> Hub<B> {
    pub fn new(backend: Arc<B>, config: &PlayerlinkConfig) -> (Self, HubHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (scheduler, ticks) = PollScheduler::new(&config.poll);
        let (store, writer) = StateStore::new(config.profile);

        let local = Peer {
            origin: config.peers.local_origin.clone(),
            endpoint: Arc::new(LocalEndpoint),
        };
        let mut registry = PeerRegistry::new();
        registry.insert_trusted(local.clone());
        registry.apply_config(&config.peers.trusted_origins);

        let handle = HubHandle {
            tx: events_tx.clone(),
        };
        let hub = Self {
            backend,
            registry,
            store,
            writer,
            scheduler,
            ticks,
            events_tx,
            events_rx,
            local,
            liveness_interval: config.peers.liveness_interval(),
        };
        (hub, handle)
    }

    /// Run until shutdown. `version` is what the backend reported at startup.
    ///
    /// Returns only once the shutdown channel fires.
    pub async fn run(mut self, version: String, mut shutdown: broadcast::Receiver<()>) {
        let fx = self.store.set(&self.writer, SlotUpdate::Version(version));
        self.apply(fx);
        self.scheduler.schedule();

        let mut liveness = time::interval(self.liveness_interval);
        liveness.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            profile = ?self.store.profile(),
            local_origin = %self.local.origin,
            "hub running"
        );

        loop {
            let step = tokio::select! {
                Some(event) = self.events_rx.recv() => Step::Event(event),
                Some(PollTick) = self.ticks.recv() => Step::Poll,
                _ = liveness.tick() => Step::Sweep,
                _ = shutdown.recv() => Step::Shutdown,
            };

            match step {
                Step::Event(event) => self.handle_event(event),
                Step::Poll => self.poll(),
                Step::Sweep => self.sweep(),
                Step::Shutdown => break,
            }
        }

        self.scheduler.cancel();
        tracing::info!("hub stopped");
    }

    fn handle_event(&mut self, event: HubEvent) {
        match event {
            HubEvent::Inbound {
                origin,
                endpoint,
                message,
            } => {
                self.handle_inbound(&origin, endpoint, message);
            }
            HubEvent::Local { message, reply } => {
                let origin = self.local.origin.clone();
                let endpoint = self.local.endpoint.clone();
                let applied = self.handle_inbound(&origin, endpoint, message);
                let _ = reply.send(applied);
            }
            HubEvent::Status(result) => self.reconcile(result),
            HubEvent::Title { generation, result } => {
                // Lookup failures leave the title as it was.
                if let Ok(title) = result {
                    let fx = self.store.title_fetched(generation, title);
                    self.apply(fx);
                }
            }
            HubEvent::Playlist { generation, result } => {
                if let Ok(body) = result {
                    let fx = self.store.playlist_fetched(generation, &body);
                    self.apply(fx);
                }
            }
            HubEvent::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    /// Returns whether the message had any effect.
    fn handle_inbound(&mut self, origin: &str, endpoint: Arc<dyn Endpoint>, message: Inbound) -> bool {
        if let Inbound::Hello { payload } = message {
            return match self.registry.handle_hello(origin, endpoint, payload) {
                HelloOutcome::Ignored => false,
                HelloOutcome::Requested(_) => true,
                HelloOutcome::Admitted | HelloOutcome::Reconnected => {
                    let fx = self.store.resend_all(SendTarget::peer(origin));
                    self.apply(fx);
                    true
                }
            };
        }

        if !self.registry.is_trusted(origin) {
            return false;
        }

        match message {
            Inbound::Hello { .. } => false,
            Inbound::Accept { origin: candidate } => {
                if self.registry.accept(&candidate).is_none() {
                    return false;
                }
                let fx = self.store.resend_all(SendTarget::peer(candidate));
                self.apply(fx);
                true
            }
            Inbound::Reject { origin: candidate } => self.registry.reject(&candidate),
            action => {
                let Some(command) = dispatch::command_for(&action) else {
                    return false;
                };
                dispatch::invoke(self.backend.clone(), command);
                if dispatch::triggers_update(&action) {
                    self.scheduler.schedule();
                }
                true
            }
        }
    }

    fn poll(&mut self) {
        self.spawn_fetch(Query::CurrentId, HubEvent::Status);
    }

    /// Fold one poll result into the store. Failures go offline and wait for
    /// the next tick; there is no immediate retry.
    fn reconcile(&mut self, result: Result<String, BackendError>) {
        let was_online = self.store.is_online();
        let record = match result {
            Ok(text) => StatusRecord::parse(&text, self.store.profile()).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let fx = match record {
            Ok(record) => self.store.apply_status(&self.writer, &record),
            Err(reason) => {
                if was_online {
                    tracing::warn!(reason = %reason, "backend went offline");
                }
                self.store.apply_offline(&self.writer)
            }
        };
        self.apply(fx);

        if !was_online && self.store.is_online() {
            tracing::info!("backend online");
        }
    }

    fn sweep(&mut self) {
        for origin in self.registry.sweep_closed() {
            tracing::info!(origin = %origin, "peer connection closed");
        }
    }

    fn apply(&mut self, fx: Vec<Effect>) {
        for effect in fx {
            match effect {
                Effect::Send(target, message) => self.registry.send(&target, &message),
                Effect::FetchTitle { generation } => {
                    self.spawn_fetch(Query::CurrentTitle, move |result| HubEvent::Title {
                        generation,
                        result,
                    })
                }
                Effect::FetchPlaylist { generation } => {
                    self.spawn_fetch(Query::Playlist, move |result| HubEvent::Playlist {
                        generation,
                        result,
                    })
                }
            }
        }
    }

    fn spawn_fetch<F>(&self, query: Query, wrap: F)
    where
        F: FnOnce(Result<String, BackendError>) -> HubEvent + Send + 'static,
    {
        let backend = self.backend.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.fetch(query.path()).await;
            let _ = tx.send(wrap(result));
        });
    }

    fn snapshot(&self) -> HubSnapshot {
        HubSnapshot {
            profile: self.store.profile(),
            local_origin: self.local.origin.clone(),
            state: self.store.snapshot(),
            trusted: self.registry.trusted_origins(),
            pending: self.registry.pending_origins(),
        }
    }
}
