//! Shared data structures for the furnace telemetry stream
//!
//! - `RowRecord` / `FieldValue`: one pushed telemetry row (CSV line after
//!   translation and feature derivation)
//! - `fields`: canonical field names used across ingest and dashboard
//! - Prediction service request/response bodies

pub mod fields;
mod row;
mod prediction;

pub use row::*;
pub use prediction::*;
