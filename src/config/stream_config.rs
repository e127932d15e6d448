//! Stream Configuration - replay and dashboard settings as TOML values
//!
//! Each struct implements `Default` with values taken from
//! [`super::defaults`], so a missing file behaves exactly like the
//! hardcoded deployment.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "FURNACE_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "furnace_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration shared by the replay server and the dashboard.
///
/// Load with `StreamConfig::load()` which searches:
/// 1. `$FURNACE_CONFIG` env var
/// 2. `./furnace_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// WebSocket server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Source files and push cadence
    #[serde(default)]
    pub replay: ReplayConfig,

    /// Dashboard client settings
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl StreamConfig {
    /// Load configuration using the standard search order:
    /// 1. `$FURNACE_CONFIG` environment variable
    /// 2. `./furnace_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded stream config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded stream config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check every section and report all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.addr: '{}' is not a valid socket address",
                self.server.addr
            ));
        }

        if self.replay.data_files.is_empty() {
            errors.push("replay.data_files: at least one source file is required".to_string());
        }

        if self.dashboard.history_capacity == 0 {
            errors.push("dashboard.history_capacity: must be greater than zero".to_string());
        }

        if self.dashboard.request_timeout_secs == Some(0) {
            errors.push("dashboard.request_timeout_secs: must be greater than zero when set".to_string());
        }

        self.dashboard
            .blast_volume_range
            .check("dashboard.blast_volume_range", &mut errors);
        self.dashboard
            .feeder_speed_range
            .check("dashboard.feeder_speed_range", &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({0:?}): {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Config parse error ({0:?}): {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Server
// ============================================================================

/// WebSocket server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    ///
    /// Can be overridden by `FURNACE_SERVER_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

// ============================================================================
// Replay
// ============================================================================

/// Dataset location and push cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Source CSV files, replayed back to back in this order
    #[serde(default = "default_data_files")]
    pub data_files: Vec<PathBuf>,

    /// Delay between pushed rows (ms)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Metadata lines skipped before the header line
    #[serde(default = "default_preamble_lines")]
    pub preamble_lines: usize,
}

fn default_data_files() -> Vec<PathBuf> {
    defaults::DATA_FILES.iter().map(PathBuf::from).collect()
}
const fn default_interval_ms() -> u64 {
    defaults::REPLAY_INTERVAL_MS
}
const fn default_preamble_lines() -> usize {
    defaults::CSV_PREAMBLE_LINES
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            data_files: default_data_files(),
            interval_ms: default_interval_ms(),
            preamble_lines: default_preamble_lines(),
        }
    }
}

// ============================================================================
// Dashboard
// ============================================================================

/// Closed `[min, max]` interval an operator override must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
}

impl ParameterRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside the range, bounds included.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass, so test finiteness first
        if !self.min.is_finite() || !self.max.is_finite() {
            errors.push(format!(
                "{name}: bounds must be finite (got min={}, max={})",
                self.min, self.max
            ));
            return;
        }
        if self.max < self.min {
            errors.push(format!(
                "{name}: max ({:.3}) must be >= min ({:.3})",
                self.max, self.min
            ));
        }
    }
}

/// Dashboard client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Telemetry WebSocket URL
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// Prediction service base URL (`/predict` and `/recommend` are appended)
    #[serde(default = "default_prediction_url")]
    pub prediction_url: String,

    /// Rolling history capacity for telemetry and predictions
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Minimum spacing between recommendation refreshes (ms)
    #[serde(default = "default_recommendation_debounce_ms")]
    pub recommendation_debounce_ms: u64,

    /// Optional per-request timeout for the prediction service. Unset means
    /// a stalled request stalls that round indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Accepted override range for overall blast volume
    #[serde(default = "default_blast_volume_range")]
    pub blast_volume_range: ParameterRange,

    /// Accepted override range for feeder 2 speed
    #[serde(default = "default_feeder_speed_range")]
    pub feeder_speed_range: ParameterRange,
}

fn default_ws_url() -> String {
    defaults::DASHBOARD_WS_URL.to_string()
}
fn default_prediction_url() -> String {
    defaults::PREDICTION_URL.to_string()
}
const fn default_history_capacity() -> usize {
    defaults::HISTORY_CAPACITY
}
const fn default_recommendation_debounce_ms() -> u64 {
    defaults::RECOMMENDATION_DEBOUNCE_MS
}
const fn default_blast_volume_range() -> ParameterRange {
    ParameterRange::new(defaults::BLAST_VOLUME_RANGE.0, defaults::BLAST_VOLUME_RANGE.1)
}
const fn default_feeder_speed_range() -> ParameterRange {
    ParameterRange::new(defaults::FEEDER_SPEED_RANGE.0, defaults::FEEDER_SPEED_RANGE.1)
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            prediction_url: default_prediction_url(),
            history_capacity: default_history_capacity(),
            recommendation_debounce_ms: default_recommendation_debounce_ms(),
            request_timeout_secs: None,
            blast_volume_range: default_blast_volume_range(),
            feeder_speed_range: default_feeder_speed_range(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = StreamConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.addr, "0.0.0.0:5001");
        assert_eq!(config.replay.data_files.len(), 3);
        assert_eq!(config.replay.interval_ms, 1_000);
        assert_eq!(config.dashboard.history_capacity, 100);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_str = r#"
[replay]
interval_ms = 250

[dashboard]
feeder_speed_range = { min = 10.0, max = 50.0 }
"#;
        let config: StreamConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.replay.interval_ms, 250);
        assert_eq!(config.replay.preamble_lines, 2);
        assert_eq!(config.dashboard.feeder_speed_range, ParameterRange::new(10.0, 50.0));
        assert_eq!(config.dashboard.blast_volume_range, ParameterRange::new(800.0, 1_200.0));
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_toml_roundtrip_preserves_values() {
        let mut config = StreamConfig::default();
        config.dashboard.request_timeout_secs = Some(10);
        let text = config.to_toml().unwrap();
        let back: StreamConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = StreamConfig::default();
        config.server.addr = "not an address".to_string();
        config.replay.data_files.clear();
        config.dashboard.history_capacity = 0;
        config.dashboard.feeder_speed_range = ParameterRange::new(45.0, 15.0);
        config.dashboard.blast_volume_range = ParameterRange::new(f64::NAN, 1.0);

        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 5, "{errors:?}"),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("furnace_config.toml");
        std::fs::write(&path, "[dashboard]\nhistory_capacity = 0\n").unwrap();
        assert!(matches!(
            StreamConfig::load_from_file(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = ParameterRange::new(15.0, 45.0);
        assert!(range.contains(15.0));
        assert!(range.contains(45.0));
        assert!(!range.contains(45.01));
        assert!(!range.contains(f64::NAN));
    }
}
