//! playerlink integration test harness.
//!
//! Every test runs in-process: a fake player backend served by axum on an
//! ephemeral port, a real hub talking to it over HTTP, and peers attached
//! through channel endpoints. Timings are shortened so a full poll cycle
//! takes a fraction of a second.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Map;
use tokio::sync::{broadcast, mpsc::UnboundedReceiver};

use playerlink_core::config::PlayerlinkConfig;
use playerlink_core::{Inbound, Outbound, Profile};
use playerlink_services::{ChannelEndpoint, HttpBackend, Hub, HubHandle, HubSnapshot};

mod acl;
mod api;
mod offline;
mod scenario;

// ── Harness ───────────────────────────────────────────────────────────────────

pub const CONTROLLER: &str = "https://controller.example";
pub const WIDGET: &str = "https://widget.example";

pub const PERIOD_MS: u64 = 200;
pub const WAIT: Duration = Duration::from_secs(3);

#[derive(Default)]
struct PlayerState {
    responses: HashMap<String, String>,
    requests: Vec<String>,
    down: bool,
}

/// Stand-in for the player's action API. Paths without a canned response
/// answer 200 with an empty body, like the real command endpoints.
#[derive(Clone, Default)]
pub struct FakePlayer {
    state: Arc<Mutex<PlayerState>>,
}

impl FakePlayer {
    pub fn respond(&self, path: &str, body: &str) {
        let mut s = self.state.lock().unwrap();
        s.responses.insert(path.to_string(), body.to_string());
    }

    pub fn set_down(&self, down: bool) {
        self.state.lock().unwrap().down = down;
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn received(&self, path: &str) -> bool {
        self.requests().iter().any(|r| r == path)
    }

    /// Serve on 127.0.0.1 and return the base URL.
    pub async fn serve(&self) -> Result<String> {
        let app = Router::new().fallback(answer).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move { axum::serve(listener, app).await });
        Ok(format!("http://{addr}/"))
    }
}

async fn answer(State(player): State<FakePlayer>, uri: Uri) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().trim_start_matches('/').to_string())
        .unwrap_or_default();

    let mut s = player.state.lock().unwrap();
    s.requests.push(path.clone());
    if s.down {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    s.responses.get(&path).cloned().unwrap_or_default().into_response()
}

/// A running hub wired to a fake player.
pub struct Harness {
    pub player: FakePlayer,
    pub hub: HubHandle,
    pub config: PlayerlinkConfig,
    _shutdown: broadcast::Sender<()>,
}

impl Harness {
    pub async fn start(profile: Profile, player: FakePlayer) -> Result<Self> {
        let mut config = PlayerlinkConfig::default();
        config.profile = profile;
        config.backend.base_url = player.serve().await?;
        config.backend.request_timeout_ms = 1_000;
        config.poll.period_ms = PERIOD_MS;
        config.poll.probe_delay_ms = 20;
        config.peers.liveness_interval_ms = 100;
        config.peers.trusted_origins = vec![CONTROLLER.to_string()];

        let backend = Arc::new(HttpBackend::new(&config.backend)?);
        let (hub, handle) = Hub::new(backend, &config);
        let (shutdown, rx) = broadcast::channel(1);
        tokio::spawn(hub.run("23.10".to_string(), rx));

        Ok(Self {
            player,
            hub: handle,
            config,
            _shutdown: shutdown,
        })
    }

    /// Attach a peer and say hello.
    pub fn connect(&self, origin: &str) -> Peer {
        let (endpoint, rx) = ChannelEndpoint::new();
        let peer = Peer {
            origin: origin.to_string(),
            endpoint,
            rx,
        };
        peer.send(&self.hub, Inbound::Hello { payload: Map::new() });
        peer
    }

    pub async fn snapshot(&self) -> HubSnapshot {
        self.hub.snapshot().await.expect("hub running")
    }

    /// Poll snapshots until `pred` holds or the wait runs out.
    pub async fn eventually(&self, pred: impl Fn(&HubSnapshot) -> bool) -> HubSnapshot {
        let deadline = tokio::time::Instant::now() + WAIT;
        loop {
            let snap = self.snapshot().await;
            if pred(&snap) {
                return snap;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "condition not reached, last snapshot: {snap:?}"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

/// Serve the control API and `/ws` for a harness. Returns the base URL.
pub async fn serve_api(h: &Harness) -> Result<String> {
    let app = playerlink_api::router(playerlink_api::ApiState { hub: h.hub.clone() });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move { axum::serve(listener, app).await });
    Ok(format!("http://{addr}"))
}

/// One peer context: its origin, endpoint and the messages it receives.
pub struct Peer {
    pub origin: String,
    pub endpoint: Arc<ChannelEndpoint>,
    pub rx: UnboundedReceiver<Outbound>,
}

impl Peer {
    pub fn send(&self, hub: &HubHandle, message: Inbound) {
        hub.deliver(self.origin.clone(), self.endpoint.clone(), message);
    }

    pub async fn recv(&mut self) -> Outbound {
        tokio::time::timeout(WAIT, self.rx.recv())
            .await
            .expect("timed out waiting for a message")
            .expect("endpoint closed")
    }

    /// Collect messages up to and including the first one matching `pred`.
    pub async fn recv_until(&mut self, pred: impl Fn(&Outbound) -> bool) -> Vec<Outbound> {
        let mut seen = Vec::new();
        loop {
            let message = self.recv().await;
            let done = pred(&message);
            seen.push(message);
            if done {
                return seen;
            }
        }
    }

    /// Everything queued right now.
    pub fn drain(&mut self) -> Vec<Outbound> {
        let mut out = Vec::new();
        while let Ok(m) = self.rx.try_recv() {
            out.push(m);
        }
        out
    }

    /// Assert nothing arrives for `periods` poll periods.
    pub async fn assert_quiet(&mut self, periods: u64) {
        tokio::time::sleep(Duration::from_millis(PERIOD_MS * periods)).await;
        let extra = self.drain();
        assert!(extra.is_empty(), "unexpected messages: {extra:?}");
    }
}

pub fn title(text: &str) -> Outbound {
    Outbound::Title {
        title: text.to_string(),
    }
}

/// The player from the gallery walkthrough: playlist 3, item 7, volume 55.
pub fn gallery_player() -> FakePlayer {
    let player = FakePlayer::default();
    player.respond("current?id", "3:7:55");
    player.respond("current?title", "Movie A");
    player.respond("playlist", "Movie A\nMovie B\n");
    player
}
