//! Stream Configuration Module
//!
//! Provides the replay and dashboard configuration loaded from TOML files.
//!
//! ## Loading Order
//!
//! 1. `FURNACE_CONFIG` environment variable (path to TOML file)
//! 2. `furnace_config.toml` in the current working directory
//! 3. Built-in defaults (see [`defaults`])
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! config::init(StreamConfig::load());
//! let interval = config::get().replay.interval_ms;
//! ```

mod stream_config;
pub mod defaults;

pub use stream_config::*;

use std::sync::OnceLock;

/// Global stream configuration, initialized once at startup.
static STREAM_CONFIG: OnceLock<StreamConfig> = OnceLock::new();

/// Initialize the global stream configuration.
///
/// A second call is ignored with a warning.
pub fn init(config: StreamConfig) {
    if STREAM_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global stream configuration.
///
/// Falls back to built-in defaults when `init()` has not been called, which
/// keeps library users and tests independent of process startup.
pub fn get() -> &'static StreamConfig {
    STREAM_CONFIG.get_or_init(StreamConfig::default)
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    STREAM_CONFIG.get().is_some()
}
