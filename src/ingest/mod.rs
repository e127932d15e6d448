//! Dataset ingestion
//!
//! ```text
//! CSV file(s) ──► csv_loader ──► translator ──► date filter ──► features ──► Vec<RowRecord>
//! ```
//!
//! [`dataset::load_dataset`] runs the whole chain for the configured source
//! files. Every stage is a pure function over owned records, so a replay can
//! rebuild its own copy of the dataset per connection.

pub mod csv_loader;
pub mod dataset;
pub mod features;
pub mod translator;

pub use csv_loader::{load_csv, LoadError};
pub use dataset::{load_dataset, preprocess, Dataset, DatasetError, LoadStats};
pub use features::{derive_features, parse_row_date};
pub use translator::{canonical_name, translate_row, translation, COLUMN_TRANSLATIONS};
