//! Furnace dashboard
//!
//! Terminal client for the telemetry stream: charts incoming rows, shows
//! the predicted Cu content and recommendations, and accepts manual
//! overrides on stdin.
//!
//! ```bash
//! ./furnace-dashboard --ws-url ws://localhost:5001 --prediction-url http://localhost:5002
//! ```
//!
//! Logs go to stderr; redirect them (`2>dashboard.log`) to keep the panel clean.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use furnace_telemetry::config::StreamConfig;
use furnace_telemetry::dashboard::{run_dashboard, HttpPredictionClient};

#[derive(Parser, Debug)]
#[command(name = "furnace-dashboard")]
#[command(about = "Furnace telemetry dashboard with Cu prediction and recommendations")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (default: $FURNACE_CONFIG, then ./furnace_config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Telemetry stream URL (default: "ws://localhost:5001")
    #[arg(long)]
    ws_url: Option<String>,

    /// Prediction service base URL (default: "http://localhost:5002")
    #[arg(long)]
    prediction_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let mut stream_config = match &args.config {
        Some(path) => StreamConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => StreamConfig::load(),
    };
    if let Some(url) = args.ws_url {
        stream_config.dashboard.ws_url = url;
    }
    if let Some(url) = args.prediction_url {
        stream_config.dashboard.prediction_url = url;
    }
    stream_config.validate().context("Invalid configuration")?;
    let dashboard = stream_config.dashboard;

    let client = HttpPredictionClient::new(
        &dashboard.prediction_url,
        dashboard.request_timeout_secs.map(Duration::from_secs),
    )
    .context("Failed to build prediction client")?;
    info!(
        ws_url = %dashboard.ws_url,
        prediction_url = %client.base_url(),
        "Starting dashboard"
    );

    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        shutdown_token.cancel();
    });

    run_dashboard(&dashboard, &client, cancel_token).await?;
    info!("Dashboard closed");
    Ok(())
}
