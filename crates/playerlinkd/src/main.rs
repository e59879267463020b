//! playerlinkd: player state sync daemon.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast;

use playerlink_api::ApiState;
use playerlink_core::config::PlayerlinkConfig;
use playerlink_services::{probe_version, HttpBackend, Hub};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = PlayerlinkConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = PlayerlinkConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        PlayerlinkConfig::default()
    });

    tracing::info!(
        profile = ?config.profile,
        backend = %config.backend.base_url,
        api_port = config.api.port,
        "playerlinkd starting"
    );

    let backend = Arc::new(
        HttpBackend::new(&config.backend).context("failed to build backend client")?,
    );

    // Shutdown broadcast
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // Nothing is wired until the player answers.
    let Some(version) = wait_for_backend(
        &backend,
        config.poll.period(),
        shutdown_tx.subscribe(),
    )
    .await
    else {
        tracing::info!("shut down before backend came up");
        return Ok(());
    };
    tracing::info!(version = %version, "backend ready");

    let (hub, hub_handle) = Hub::new(backend, &config);
    let hub_task = tokio::spawn(hub.run(version, shutdown_tx.subscribe()));

    let api_task = {
        let state = ApiState {
            hub: hub_handle.clone(),
        };
        let port = config.api.port;
        tokio::spawn(async move {
            if let Err(e) = playerlink_api::serve(state, port).await {
                tracing::error!(error = %e, "API server failed");
            }
        })
    };

    let state_printer = {
        let hub = hub_handle.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(snap) = hub.snapshot().await else {
                    break;
                };
                tracing::debug!(
                    online = ?snap.state.online,
                    title = ?snap.state.title,
                    trusted = snap.trusted.len(),
                    pending = snap.pending.len(),
                    "state snapshot"
                );
            }
        })
    };

    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::select! {
        _ = shutdown_rx.recv() => tracing::info!("shutting down"),
        r = hub_task           => tracing::error!("hub exited: {:?}", r),
        r = api_task           => tracing::error!("API task exited: {:?}", r),
        r = state_printer      => tracing::error!("state printer exited: {:?}", r),
    }

    Ok(())
}

/// Probe `version` every `period` until it answers with a non-empty body.
/// Returns `None` if shutdown arrives first.
async fn wait_for_backend(
    backend: &HttpBackend,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> Option<String> {
    loop {
        match probe_version(backend).await {
            Ok(version) => return Some(version),
            Err(e) => {
                tracing::warn!(error = %e, retry_ms = period.as_millis() as u64, "backend not ready");
            }
        }
        tokio::select! {
            _ = tokio::time::sleep(period) => {}
            _ = shutdown.recv() => return None,
        }
    }
}
