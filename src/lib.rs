//! Furnace Telemetry: replay server and prediction dashboard
//!
//! Replays historian CSV exports of a Vanyukov smelting furnace over
//! WebSocket, one row per interval, and drives a terminal dashboard that
//! asks an external model service for the predicted Cu content and
//! operator recommendations.
//!
//! ## Architecture
//!
//! - **Ingest**: CSV loading, column translation, feature derivation
//! - **Publisher**: per-connection row replay
//! - **API**: Axum WebSocket endpoint and health check
//! - **Dashboard**: rolling history, prediction rounds, manual overrides

pub mod api;
pub mod config;
pub mod dashboard;
pub mod ingest;
pub mod publisher;
pub mod types;

// Re-export configuration
pub use config::StreamConfig;

// Re-export commonly used types
pub use types::{FieldValue, PredictionRequest, Recommendation, RowRecord};

// Re-export ingest
pub use ingest::{load_dataset, Dataset, DatasetError};

// Re-export publisher
pub use publisher::{ReplayReport, RowReplay, RowSink, StopReason};

// Re-export dashboard components
pub use dashboard::{DashboardState, HttpPredictionClient, PredictionService};
