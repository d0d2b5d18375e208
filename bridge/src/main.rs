use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use concord_bridge::config::BridgeConfig;
use concord_bridge::engine::{Directory, DirectorySnapshot, SharedDirectory, TracingChats};

#[derive(Parser)]
#[command(name = "concord-bridge", about = "Concord bridge session directory tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the bridge config file.
    #[arg(long, global = true, default_value = "concord-bridge.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a directory snapshot, resolve ids against it, then tear it down.
    Inspect {
        /// JSON snapshot of the directory.
        snapshot: PathBuf,
        /// Server id to look up (also scopes --channel and --user).
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        channel: Option<String>,
        #[arg(long)]
        user: Option<String>,
        /// Print the loaded directory back out as JSON.
        #[arg(long, default_value_t = false)]
        dump: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = BridgeConfig::load(&cli.config)?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.filter)),
        )
        .init();

    match cli.command {
        Commands::Inspect {
            snapshot,
            server,
            channel,
            user,
            dump,
        } => {
            let query = Query {
                server,
                channel,
                user,
            };
            inspect(&config, &snapshot, &query, dump).await
        }
    }
}

struct Query {
    server: Option<String>,
    channel: Option<String>,
    user: Option<String>,
}

async fn inspect(
    config: &BridgeConfig,
    path: &Path,
    query: &Query,
    dump: bool,
) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let mut snapshot = DirectorySnapshot::from_json(&json)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
    if let Some(url) = &config.gateway.url {
        snapshot.gateway = url.clone();
    }
    if let Some(token) = &config.gateway.token {
        snapshot.token = token.clone();
    }

    let mut chats = TracingChats::new();
    let directory = Directory::from_snapshot(snapshot, &mut chats)
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;
    info!(gateway = %directory.gateway(), "session directory ready");

    let shared = SharedDirectory::new(directory);
    let report = shared
        .finish(&mut chats, |d| {
            let mut lines = Vec::new();
            let server_id = query.server.as_deref();

            if let Some(server_id) = server_id {
                lines.push(match d.find_server(server_id) {
                    Some(s) => format!(
                        "server {}: {} ({} channels, {} users, known since {})",
                        s.id(),
                        s.name(),
                        s.channels().len(),
                        s.users().len(),
                        s.created_at.format("%Y-%m-%d %H:%M:%S UTC")
                    ),
                    None => format!("server {server_id}: not found"),
                });
            }
            if let Some(channel_id) = query.channel.as_deref() {
                lines.push(match d.find_channel(channel_id, server_id) {
                    Some(c) => match c.name() {
                        Some(name) => format!("channel {}: {}", c.id(), name),
                        None => format!("channel {}: text chat", c.id()),
                    },
                    None => format!("channel {channel_id}: not found"),
                });
            }
            if let Some(user_id) = query.user.as_deref() {
                lines.push(match d.find_user(user_id, server_id) {
                    Some(u) => format!("user {}: {}", u.id(), u.name()),
                    None => format!("user {user_id}: not found"),
                });
            }
            if dump {
                lines.push(d.snapshot().to_json_pretty()?);
            }
            anyhow::Ok(lines)
        })
        .await;
    info!(open_chats = chats.open_count(), "session closed");

    for line in report.context("session directory already shut down")?? {
        println!("{line}");
    }
    Ok(())
}
