//! Handshake answers sent as the daemon's own origin.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::http::{base_url, post_json_body};

#[derive(Serialize)]
struct AclRequest<'a> {
    origin: &'a str,
}

#[derive(Deserialize)]
struct AclResponse {
    origin:  String,
    applied: bool,
}

pub async fn cmd_accept(port: u16, origin: &str) -> Result<()> {
    let resp: AclResponse =
        post_json_body(&format!("{}/acl/accept", base_url(port)), &AclRequest { origin }).await?;

    if resp.applied {
        println!("Accepted {}. It now receives the full player state.", resp.origin);
    } else {
        println!("{} is not pending; nothing changed.", resp.origin);
    }
    Ok(())
}

pub async fn cmd_reject(port: u16, origin: &str) -> Result<()> {
    let resp: AclResponse =
        post_json_body(&format!("{}/acl/reject", base_url(port)), &AclRequest { origin }).await?;

    if resp.applied {
        println!("Rejected {}.", resp.origin);
    } else {
        println!("{} is not known; nothing changed.", resp.origin);
    }
    Ok(())
}
