//! System-wide default constants.
//!
//! Every fixed value of the replay server and the dashboard
//! lives here, grouped by subsystem. `StreamConfig` defaults are built from
//! these.

// ============================================================================
// Server
// ============================================================================

/// WebSocket server bind address.
pub const SERVER_ADDR: &str = "0.0.0.0:5001";

// ============================================================================
// Replay
// ============================================================================

/// Source files replayed to every connection, concatenated in this order.
pub const DATA_FILES: [&str; 3] = ["data/data1.csv", "data/data2.csv", "data/data3.csv"];

/// Delay between two pushed rows (milliseconds).
pub const REPLAY_INTERVAL_MS: u64 = 1_000;

/// Metadata lines preceding the header line in every source file.
pub const CSV_PREAMBLE_LINES: usize = 2;

// ============================================================================
// Dashboard
// ============================================================================

/// Telemetry stream the dashboard subscribes to.
pub const DASHBOARD_WS_URL: &str = "ws://localhost:5001";

/// Base URL of the external prediction service.
pub const PREDICTION_URL: &str = "http://localhost:5002";

/// Capacity of the telemetry and prediction rolling histories.
pub const HISTORY_CAPACITY: usize = 100;

/// Minimum spacing between two recommendation list refreshes (milliseconds).
pub const RECOMMENDATION_DEBOUNCE_MS: u64 = 5_000;

/// Accepted operator range for `Overall blast volume, m3/h`.
pub const BLAST_VOLUME_RANGE: (f64, f64) = (800.0, 1_200.0);

/// Accepted operator range for `feeder 2, speed`.
pub const FEEDER_SPEED_RANGE: (f64, f64) = (15.0, 45.0);

// ============================================================================
// Prediction payload fallbacks
// ============================================================================

/// Sent when the live total charge rate is absent or zero.
pub const FALLBACK_TOTAL_CHARGE_RATE: f64 = 100.0;

/// Sent when neither an override nor a live blast volume is available.
pub const FALLBACK_BLAST_VOLUME: f64 = 1_000.0;

/// Sent when the live oxygen enrichment is absent or zero.
pub const FALLBACK_OXYGEN_CONTENT: f64 = 21.0;

/// Sent when the live exhaust gas temperature is absent or zero.
pub const FALLBACK_EXHAUST_TEMPERATURE: f64 = 500.0;

/// Sent when the live smelting-zone temperature is absent or zero.
pub const FALLBACK_SMELTING_TEMPERATURE: f64 = 1_000.0;

/// Sent when neither an override nor a live feeder speed is available.
pub const FALLBACK_FEEDER_SPEED: f64 = 30.0;
