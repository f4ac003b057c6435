//! Society management request gateway.
//!
//! Sits between the admin/resident dashboards and the society backend.
//!
//! ```text
//!     Dashboard request          ┌──────────────────────────────────────────────┐
//!     ───────────────────────────┼─▶ http (axum) ─▶ forward ─▶ transport ───────┼──▶ Backend
//!                                │                  │  validate                 │
//!     Dashboard response         │                  │  coerce                   │
//!     ◀──────────────────────────┼── JSON envelope ◀┘  map listings ◀───────────┼─── reply
//!                                │                                              │
//!                                │  config (TOML + BACKEND_URL, hot reload)     │
//!                                │  observability (tracing, prometheus)         │
//!                                │  lifecycle (signals, graceful shutdown)      │
//!                                └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use society_gateway::config::watcher::ConfigWatcher;
use society_gateway::config::{load_config, load_from_env};
use society_gateway::lifecycle::{signals, Shutdown};
use society_gateway::observability::{logging, metrics};
use society_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "society-gateway")]
#[command(about = "Request gateway between the society dashboards and the backend", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    logging::init(&config.observability.log_level);
    tracing::info!("society-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher alive for the life of the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
