//! Furnace telemetry replay server
//!
//! Loads the configured historian exports and replays them, one row per
//! interval, to every WebSocket client that connects.
//!
//! # Usage
//!
//! ```bash
//! # Serve data/data{1,2,3}.csv on 0.0.0.0:5001
//! cargo run --release
//!
//! # Custom config and address
//! ./furnace-telemetry --config furnace_config.toml --addr 127.0.0.1:6001
//! ```
//!
//! # Environment Variables
//!
//! - `FURNACE_CONFIG`: Path to the TOML config file
//! - `FURNACE_SERVER_ADDR`: Override the listen address
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

use furnace_telemetry::api::{create_app, StreamState};
use furnace_telemetry::config::{self, StreamConfig};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "furnace-telemetry")]
#[command(about = "Furnace telemetry WebSocket replay server")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (default: $FURNACE_CONFIG, then ./furnace_config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address (default: "0.0.0.0:5001")
    #[arg(short, long, env = "FURNACE_SERVER_ADDR")]
    addr: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn load_config(args: &CliArgs) -> Result<StreamConfig> {
    let mut stream_config = match &args.config {
        Some(path) => StreamConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => StreamConfig::load(),
    };
    if let Some(addr) = &args.addr {
        stream_config.server.addr.clone_from(addr);
    }
    stream_config.validate().context("Invalid configuration")?;
    Ok(stream_config)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let stream_config = load_config(&args)?;
    if args.print_config {
        print!("{}", stream_config.to_toml()?);
        return Ok(());
    }
    config::init(stream_config);
    let cfg = config::get();

    info!("Furnace telemetry replay server");
    info!(
        files = cfg.replay.data_files.len(),
        interval_ms = cfg.replay.interval_ms,
        preamble_lines = cfg.replay.preamble_lines,
        "Replay settings"
    );
    for file in &cfg.replay.data_files {
        info!(path = %file.display(), "Data source");
    }

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let listener = tokio::net::TcpListener::bind(&cfg.server.addr)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.server.addr))?;
    info!("WebSocket server is running on ws://{}", listener.local_addr()?);

    let state = StreamState::new(cfg.replay.clone(), cancel_token.clone());
    let app = create_app(state);

    // Open sessions stop at their next row once the token fires.
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
            info!("Received shutdown signal");
        })
        .await
        .context("HTTP server error")?;
    info!("Graceful shutdown complete");
    Ok(())
}
