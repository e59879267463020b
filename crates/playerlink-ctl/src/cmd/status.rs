//! Status and peer listing commands.

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, get_json};

#[derive(Deserialize)]
struct StatusResponse {
    profile: String,
    online:  bool,
    version: Option<String>,
    state:   StateInfo,
    trusted: usize,
    pending: usize,
}

#[derive(Deserialize)]
struct StateInfo {
    volume:      Option<i64>,
    playing:     Option<bool>,
    muted:       Option<bool>,
    playlist_id: Option<i64>,
    file_id:     Option<i64>,
    title:       Option<String>,
    playlist:    Vec<String>,
}

#[derive(Deserialize)]
struct PeersResponse {
    local_origin: String,
    trusted:      Vec<String>,
    pending:      Vec<String>,
}

fn show<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  Player Link Status");
    println!("═══════════════════════════════════════");
    println!("  Profile  : {}", resp.profile);
    println!("  Backend  : {}", if resp.online { "online" } else { "offline" });
    println!("  Version  : {}", show(resp.version));
    println!("  Peers    : {} trusted, {} pending", resp.trusted, resp.pending);

    let s = resp.state;
    println!("\n  Now playing:");
    println!("  ┌─ {}", s.title.filter(|t| !t.is_empty()).unwrap_or_else(|| "(nothing)".into()));
    println!("  │  playlist : {} ({} items)", show(s.playlist_id), s.playlist.len());
    println!("  │  index    : {}", show(s.file_id));
    println!("  │  volume   : {}", show(s.volume));
    println!("  │  playing  : {}", show(s.playing));
    println!("  └─ muted    : {}", show(s.muted));

    Ok(())
}

pub async fn cmd_peers(port: u16) -> Result<()> {
    let resp: PeersResponse = get_json(&format!("{}/peers", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  Trusted Origins ({})", resp.trusted.len());
    println!("═══════════════════════════════════════");
    for origin in &resp.trusted {
        if *origin == resp.local_origin {
            println!("  {}  (local)", origin);
        } else {
            println!("  {}", origin);
        }
    }

    if !resp.pending.is_empty() {
        println!("\n  Pending:");
        for origin in &resp.pending {
            println!("  ? {}", origin);
        }
    }

    Ok(())
}

pub async fn cmd_pending(port: u16) -> Result<()> {
    let resp: PeersResponse = get_json(&format!("{}/peers", base_url(port))).await?;

    if resp.pending.is_empty() {
        println!("No origins waiting for an answer.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Pending Origins ({})", resp.pending.len());
    println!("═══════════════════════════════════════");
    for origin in &resp.pending {
        println!("  {}", origin);
    }
    println!("\n  Answer with: playerlink-ctl accept|reject <origin>");

    Ok(())
}
