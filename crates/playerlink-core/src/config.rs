//! Configuration system for playerlink.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $PLAYERLINK_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/playerlink/config.toml
//!   3. ~/.config/playerlink/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::profile::Profile;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerlinkConfig {
    pub profile: Profile,
    pub backend: BackendConfig,
    pub poll: PollConfig,
    pub peers: PeersConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the player's action API. Endpoint paths are appended as-is.
    pub base_url: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Steady-state polling period.
    pub period_ms: u64,
    /// Delay of the fast probe armed on every reschedule.
    pub probe_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeersConfig {
    /// Origin the daemon itself answers as. Trusted from startup.
    ///
    /// A WebSocket client presenting this `Origin` header is treated as the
    /// daemon's own peer with no handshake. Browsers cannot forge the
    /// header, but local processes can: the API's 127.0.0.1 bind is the
    /// trust boundary.
    pub local_origin: String,
    /// Origins admitted on hello without asking trusted peers.
    pub trusted_origins: Vec<String>,
    /// How often trusted peers are checked for closed connections.
    pub liveness_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Local HTTP port for the control API and the WebSocket endpoint.
    pub port: u16,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/".to_string(),
            request_timeout_ms: 5_000,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            period_ms: 2_000,
            probe_delay_ms: 100,
        }
    }
}

impl Default for PeersConfig {
    fn default() -> Self {
        Self {
            local_origin: "http://127.0.0.1:8080".to_string(),
            trusted_origins: Vec::new(),
            liveness_interval_ms: 2_000,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 9310 }
    }
}

/// Floor for every recurring interval. Tokio timers reject a zero period.
const MIN_PERIOD_MS: u64 = 1;

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl PollConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms.max(MIN_PERIOD_MS))
    }

    pub fn probe_delay(&self) -> Duration {
        Duration::from_millis(self.probe_delay_ms)
    }
}

impl PeersConfig {
    pub fn liveness_interval(&self) -> Duration {
        Duration::from_millis(self.liveness_interval_ms.max(MIN_PERIOD_MS))
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("playerlink")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl PlayerlinkConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::file_path())
    }

    /// Load from an explicit path, falling back to defaults if it does not exist.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))?
        } else {
            PlayerlinkConfig::default()
        };
        config.apply_env_overrides();
        config.reset_zero_durations();
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("PLAYERLINK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&PlayerlinkConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Zero periods and timeouts fall back to their defaults.
    fn reset_zero_durations(&mut self) {
        let backend = BackendConfig::default();
        let poll = PollConfig::default();
        let peers = PeersConfig::default();
        for (name, value, default) in [
            ("backend.request_timeout_ms", &mut self.backend.request_timeout_ms, backend.request_timeout_ms),
            ("poll.period_ms", &mut self.poll.period_ms, poll.period_ms),
            ("peers.liveness_interval_ms", &mut self.peers.liveness_interval_ms, peers.liveness_interval_ms),
        ] {
            if *value == 0 {
                tracing::warn!(setting = name, default, "zero is not a valid interval, using default");
                *value = default;
            }
        }
    }

    /// Apply PLAYERLINK_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("PLAYERLINK_BACKEND__BASE_URL") {
            self.backend.base_url = v;
        }
        if let Ok(v) = std::env::var("PLAYERLINK_API__PORT") {
            if let Ok(p) = v.parse() {
                self.api.port = p;
            }
        }
        if let Ok(v) = std::env::var("PLAYERLINK_POLL__PERIOD_MS") {
            if let Ok(ms) = v.parse() {
                self.poll.period_ms = ms;
            }
        }
        if let Ok(v) = std::env::var("PLAYERLINK_PROFILE") {
            if let Ok(profile) = v.parse() {
                self.profile = profile;
            }
        }
    }
}
