//! playerlink-ctl: command-line interface for the playerlink daemon.

use anyhow::{Context, Result};

mod cmd;

const DEFAULT_PORT: u16 = 9310;

fn print_usage() {
    eprintln!("Usage: playerlink-ctl [--port N] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status            Player state and backend reachability");
    eprintln!("  peers             Trusted and pending origins");
    eprintln!("  pending           Origins waiting for an answer");
    eprintln!("  accept <origin>   Trust a pending origin");
    eprintln!("  reject <origin>   Refuse a pending origin or revoke a trusted one");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Parse --port option
    let mut port = DEFAULT_PORT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--port" {
            i += 1;
            port = args
                .get(i)
                .context("--port requires a value")?
                .parse()
                .context("--port must be a number")?;
        } else {
            remaining.push(&args[i]);
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["status"] | []                => cmd::status::cmd_status(port).await,
        ["peers"]                      => cmd::status::cmd_peers(port).await,
        ["pending"]                    => cmd::status::cmd_pending(port).await,
        ["accept", origin]             => cmd::acl::cmd_accept(port, origin).await,
        ["reject", origin]             => cmd::acl::cmd_reject(port, origin).await,
        ["help"] | ["--help"] | ["-h"] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
