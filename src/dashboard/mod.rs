//! Dashboard Client
//!
//! Terminal dashboard for the telemetry stream: rolling charts of recent
//! rows, the predicted Cu content, debounced operator recommendations and
//! a manual override panel for blast volume and feeder 2 speed.
//!
//! ```text
//! WebSocket row ──► accept_message ────┐
//!                                        ├─► PendingRound (in flight) ──► finish_round ──► render
//! stdin command ──► accept_adjustment ──┘
//! ```

pub mod adjustments;
pub mod client;
pub mod history;
pub mod render;
pub mod session;
pub mod state;

pub use adjustments::{AdjustableParameter, AdjustmentError, AdjustmentRanges, ManualAdjustments};
pub use client::{HttpPredictionClient, PredictionError, PredictionService};
pub use history::RollingHistory;
pub use render::render;
pub use session::{parse_command, run_dashboard, run_dashboard_with, Command, DashboardError};
pub use state::{
    build_request, CompletedRound, ConnectionStatus, CurrentValues, DashboardState, DisplayRecord,
    PendingRound, PredictionPoint, TelemetryPoint,
};
