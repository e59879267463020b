//! Backend action API client.
//!
//! The player only answers plain-text GETs. Any transport error or
//! non-success status counts as the backend being unavailable.

use std::future::Future;

use playerlink_core::config::BackendConfig;
use playerlink_core::Query;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },
    #[error("{path} returned an empty body")]
    EmptyBody { path: String },
}

/// Source of backend data. Paths are relative to the backend base URL,
/// e.g. `current?id` or `vol?55`.
pub trait Backend: Send + Sync + 'static {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, BackendError>> + Send;
}

/// Backend reached over HTTP with reqwest.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(BackendError::Client)?;

        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Backend for HttpBackend {
    async fn fetch(&self, path: &str) -> Result<String, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| BackendError::Transport {
            path: path.to_string(),
            source,
        })
    }
}

/// Ask the backend for its version. An empty answer means the player is
/// not ready yet.
pub async fn probe_version<B: Backend>(backend: &B) -> Result<String, BackendError> {
    let path = Query::Version.path();
    let body = backend.fetch(path).await?;
    let version = body.trim();
    if version.is_empty() {
        return Err(BackendError::EmptyBody {
            path: path.to_string(),
        });
    }
    Ok(version.to_string())
}
