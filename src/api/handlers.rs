//! Request handlers: WebSocket replay and health

use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};

use super::ws_sink::WsRowSink;
use crate::config::ReplayConfig;
use crate::publisher::{run_session, SessionOutcome};

/// Shared, read-only handler state.
///
/// Nothing in here is replay state: every connection loads and owns its
/// own dataset and cursor.
#[derive(Clone)]
pub struct StreamState {
    pub replay: Arc<ReplayConfig>,
    /// Cancelled on process shutdown
    pub shutdown: CancellationToken,
    /// Connection ids for log correlation
    connections: Arc<AtomicU64>,
}

impl StreamState {
    pub fn new(replay: ReplayConfig, shutdown: CancellationToken) -> Self {
        Self {
            replay: Arc::new(replay),
            shutdown,
            connections: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Connections accepted since startup.
    pub fn connections_accepted(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }
}

// ============================================================================
// WebSocket replay
// ============================================================================

/// GET / or /ws - upgrade and start a fresh replay for this client
pub async fn stream_socket(ws: WebSocketUpgrade, State(state): State<StreamState>) -> Response {
    let id = state.connections.fetch_add(1, Ordering::Relaxed) + 1;
    ws.on_upgrade(move |socket| {
        serve_socket(socket, state).instrument(info_span!("connection", id))
    })
}

async fn serve_socket(socket: WebSocket, state: StreamState) {
    info!("New WebSocket connection");
    let mut sink = WsRowSink::new(socket);

    match run_session(&mut sink, &state.replay, state.shutdown.clone()).await {
        SessionOutcome::Replayed(_) => sink.close().await,
        SessionOutcome::LoadFailed(_) => {
            // No data for this client; hold the socket until it leaves.
            tokio::select! {
                () = sink.peer_gone() => {}
                () = state.shutdown.cancelled() => sink.close().await,
            }
        }
    }

    info!("WebSocket connection closed");
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub data_files: Vec<PathBuf>,
    pub interval_ms: u64,
    pub connections_accepted: u64,
}

/// GET /health
pub async fn get_health(State(state): State<StreamState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        data_files: state.replay.data_files.clone(),
        interval_ms: state.replay.interval_ms,
        connections_accepted: state.connections_accepted(),
    })
}
