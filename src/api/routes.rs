//! API route definitions

use axum::{routing::get, Router};

use super::handlers::{self, StreamState};

/// WebSocket replay endpoints plus health.
pub fn stream_routes(state: StreamState) -> Router {
    Router::new()
        .route("/", get(handlers::stream_socket))
        .route("/ws", get(handlers::stream_socket))
        .route("/health", get(handlers::get_health))
        .with_state(state)
}
