mod app;
mod event;
mod lyrics;
mod playback;
mod session;
mod state;
mod timer;
mod ui;
mod view;

use crate::app::App;
use crate::event::EventBus;
use crate::lyrics::{ApiClient, ServerConnections};
use crate::session::{RemotePlayback, SessionClient};
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Application configuration from CLI
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Time-synced lyrics for the item playing on a media server session")]
pub struct Config {
    /// Server base URL (e.g. http://localhost:8096)
    #[arg(long)]
    server: String,
    /// User id whose sessions and lyrics are used
    #[arg(long)]
    user_id: String,
    /// API token. If empty, the JELLYFIN_TOKEN env var will be used as a fallback.
    #[arg(long, default_value = "")]
    token: String,
    /// Server id to register the connection under (default: answer for any server)
    #[arg(long)]
    server_id: Option<String>,
    /// Pipe current lyric line to stdout (default is modern UI)
    #[arg(long)]
    pipe: bool,
    /// Blocklist for session clients/devices (comma-separated, case-insensitive)
    #[arg(
        long = "block",
        value_name = "CLIENT1,CLIENT2",
        value_delimiter = ','
    )]
    block: Vec<String>,
    /// Interval between session polls, in milliseconds
    #[arg(long, default_value_t = 1000)]
    poll_interval_ms: u64,
    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug_log: bool,
}

fn token_from_env_if_empty(cli: &mut Config) {
    if cli.token.is_empty()
        && let Ok(t) = std::env::var("JELLYFIN_TOKEN")
    {
        cli.token = t.trim().to_string();
    }
}

fn init_logging(cfg: &Config) {
    let default = match (cfg.debug_log, cfg.pipe) {
        (true, _) => "lyricsview=debug",
        (false, true) => "warn",
        // stderr shares the terminal with the full-screen UI
        (false, false) => "off",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn connections(cfg: &Config) -> ServerConnections {
    let client = ApiClient::new(&cfg.server, &cfg.user_id, &cfg.token);
    match &cfg.server_id {
        Some(id) => {
            let mut conns = ServerConnections::new();
            conns.insert(id, client);
            conns
        }
        None => ServerConnections::single(client),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut cfg = Config::parse();
    token_from_env_if_empty(&mut cfg);
    init_logging(&cfg);

    if cfg.token.is_empty() {
        tracing::warn!("no API token given; requests will likely be rejected");
    }

    let bus = EventBus::new();
    let session_client = SessionClient::new(ApiClient::new(&cfg.server, &cfg.user_id, &cfg.token));
    let playback = Arc::new(RemotePlayback::new(session_client, Arc::clone(&bus), cfg.block.clone()));
    let api = Arc::new(connections(&cfg));

    // Prime the playback state so the first activation sees the current session
    if let Err(e) = playback.poll().await {
        tracing::warn!(error = %e, "initial session poll failed");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let watcher = tokio::spawn(session::watch_sessions(
        Arc::clone(&playback),
        Duration::from_millis(cfg.poll_interval_ms.max(100)),
        session::TICK_INTERVAL,
        shutdown_rx,
    ));

    let result = if cfg.pipe {
        let (app, channels) = App::new(bus, playback, api, ui::pipe::PipeRenderer::stdout());
        app::run_pipe(app, channels).await
    } else {
        let (app, channels) = App::new(bus, playback, api, ui::modern::ModernRenderer::new());
        app::run_modern(app, channels).await
    };

    let _ = shutdown_tx.send(true);
    let _ = watcher.await;

    // Print error if any, for better diagnostics
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return Err(e);
    }
    Ok(())
}
