//! Dataset Assembler
//!
//! Loads every configured source file, concatenates them in file order
//! (no interleaving by time), translates column names, drops rows without a
//! parseable date and derives the model-input features.

use std::path::Path;
use tracing::{debug, info};

use super::csv_loader::{load_csv, LoadError};
use super::features::{derive_features, has_valid_date};
use super::translator::translate_row;
use crate::types::RowRecord;

/// Per-file failures collected over one load attempt.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("no source files configured")]
    NoSources,
    #[error("{} of {total} source files failed to load: {}", .failures.len(), summarize(.failures))]
    Files {
        total: usize,
        failures: Vec<LoadError>,
    },
}

fn summarize(failures: &[LoadError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Counters describing one assembled dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Source files read
    pub files: usize,
    /// Rows read across all files, before filtering
    pub raw_rows: usize,
    /// Rows dropped because `Date` was missing or unparseable
    pub dropped_invalid_date: usize,
}

/// The processed, ordered row sequence one replay iterates over.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub rows: Vec<RowRecord>,
    pub stats: LoadStats,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Translate, filter and derive features for already-loaded raw rows.
///
/// Returns the surviving rows and how many were dropped for an invalid date.
pub fn preprocess(raw_rows: impl IntoIterator<Item = RowRecord>) -> (Vec<RowRecord>, usize) {
    let mut dropped = 0usize;
    let rows = raw_rows
        .into_iter()
        .map(|raw| translate_row(&raw))
        .filter(|row| {
            let keep = has_valid_date(row);
            if !keep {
                dropped += 1;
            }
            keep
        })
        .map(|row| derive_features(&row))
        .collect();
    (rows, dropped)
}

/// Load and preprocess every source file.
///
/// All files are attempted; if any fails the whole load is rejected with
/// every failure listed.
pub fn load_dataset<P: AsRef<Path>>(
    files: &[P],
    preamble_lines: usize,
) -> Result<Dataset, DatasetError> {
    if files.is_empty() {
        return Err(DatasetError::NoSources);
    }

    let mut raw_rows = Vec::new();
    let mut failures = Vec::new();
    for path in files {
        let path = path.as_ref();
        match load_csv(path, preamble_lines) {
            Ok(rows) => {
                debug!(path = %path.display(), rows = rows.len(), "Source file loaded");
                raw_rows.extend(rows);
            }
            Err(e) => failures.push(e),
        }
    }

    if !failures.is_empty() {
        return Err(DatasetError::Files {
            total: files.len(),
            failures,
        });
    }

    let raw_count = raw_rows.len();
    let (rows, dropped_invalid_date) = preprocess(raw_rows);
    let stats = LoadStats {
        files: files.len(),
        raw_rows: raw_count,
        dropped_invalid_date,
    };
    info!(
        files = stats.files,
        raw_rows = stats.raw_rows,
        dropped = stats.dropped_invalid_date,
        rows = rows.len(),
        "Dataset assembled"
    );
    Ok(Dataset { rows, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fields;
    use std::io::Write;
    use std::path::PathBuf;

    const HEADER: &str = "дата,\"конвейер 31, производительность\",\"конвейер 32, производительность\",расход КВС";

    fn write_source(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "meta line 1\nmeta line 2\n{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        path
    }

    #[test]
    fn test_files_concatenate_in_order_and_invalid_dates_drop() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_source(
            dir.path(),
            "a.csv",
            &["2023-01-01 00:00:02,1,1,100", "bad date,1,1,101"],
        );
        let b = write_source(dir.path(), "b.csv", &["2023-01-01 00:00:01,2,2,200"]);
        let c = write_source(dir.path(), "c.csv", &[",3,3,300", "2023-01-01 00:00:00,3,3,301"]);

        let dataset = load_dataset(&[a, b, c], 2).unwrap();
        assert_eq!(dataset.stats.raw_rows, 5);
        assert_eq!(dataset.stats.dropped_invalid_date, 2);
        assert_eq!(dataset.len(), dataset.stats.raw_rows - dataset.stats.dropped_invalid_date);

        // file order, not time order
        let flows: Vec<_> = dataset
            .rows
            .iter()
            .map(|r| r.number_or_zero(fields::OVERALL_BLAST_VOLUME))
            .collect();
        assert_eq!(flows, vec![100.0, 200.0, 301.0]);
        assert_eq!(dataset.rows[1].number(fields::TOTAL_CHARGE_RATE), Some(4.0));
    }

    #[test]
    fn test_any_failed_file_rejects_the_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_source(dir.path(), "good.csv", &["2023-01-01 00:00:00,1,1,1"]);
        let missing_1 = dir.path().join("missing1.csv");
        let missing_2 = dir.path().join("missing2.csv");

        match load_dataset(&[missing_1, good, missing_2], 2) {
            Err(DatasetError::Files { total, failures }) => {
                assert_eq!(total, 3);
                assert_eq!(failures.len(), 2);
            }
            other => panic!("expected aggregated failure, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_file_list_is_rejected() {
        let files: [PathBuf; 0] = [];
        assert!(matches!(load_dataset(&files, 2), Err(DatasetError::NoSources)));
    }

    #[test]
    fn test_preprocess_counts_dropped_rows() {
        let raw = vec![
            RowRecord::new().with("дата", "2023-01-01 00:00:00"),
            RowRecord::new().with("дата", "yesterday"),
            RowRecord::new(),
        ];
        let (rows, dropped) = preprocess(raw);
        assert_eq!(rows.len(), 1);
        assert_eq!(dropped, 2);
        assert!(rows[0].len() >= 1 + fields::MODEL_INPUTS.len());
    }
}
