//! Access gate (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                 ACCESS GATE                   │
//!                      │                                               │
//!   POST /login  ──────┼─▶ credentials ──▶ token issuer ──▶ {token}    │
//!                      │                                               │
//!   GET /secure-data ──┼─▶ rate limiter ──▶ token validator ──▶ data   │
//!                      │   (per identity)    (shape only)              │
//!                      │                                               │
//!   GET /public-data ──┼─────────────────────────────────────▶ data    │
//!                      │                                               │
//!                      │  config · logging · metrics · lifecycle       │
//!                      └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use access_gate::config::{apply_env_overrides, load_config, GateConfig};
use access_gate::lifecycle::signals::forward_signals;
use access_gate::observability::{logging, metrics};
use access_gate::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "access-gate", version, about = "Token-issuing, rate-limiting HTTP gate")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "GATE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };
    let config = apply_env_overrides(config)?;

    logging::init(&config.observability)?;

    tracing::info!("access-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
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

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    forward_signals(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
