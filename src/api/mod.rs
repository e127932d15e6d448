//! HTTP / WebSocket surface using Axum
//!
//! - `GET /` and `GET /ws` - WebSocket upgrade; each connection gets its own
//!   replay of the dataset
//! - `GET /health` - liveness and replay settings

pub mod handlers;
mod routes;
pub mod ws_sink;

pub use handlers::StreamState;
pub use ws_sink::WsRowSink;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the complete application router.
///
/// CORS is permissive: the dashboard may be served from another origin.
pub fn create_app(state: StreamState) -> Router {
    Router::new()
        .merge(routes::stream_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
