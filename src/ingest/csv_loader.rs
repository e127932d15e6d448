//! CSV Loader
//!
//! Reads a historian export: a fixed number of metadata lines, then a header
//! line, then one record per line. Headers quote the embedded commas
//! (`"конвейер 31, производительность"`), so records go through the `csv`
//! reader rather than a naive split.

use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::types::RowRecord;

/// Errors raised while reading a single source file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read preamble of {path:?}: {source}")]
    Preamble {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path:?} ends before the header line (expected {preamble} preamble lines)")]
    MissingHeader { path: PathBuf, preamble: usize },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Load every record of `path` keyed by header, skipping `preamble_lines`
/// metadata lines first.
///
/// Short records simply lack the trailing columns; cells beyond the header
/// width are ignored.
pub fn load_csv(path: &Path, preamble_lines: usize) -> Result<Vec<RowRecord>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let mut discarded = String::new();
    for _ in 0..preamble_lines {
        discarded.clear();
        let bytes = reader
            .read_line(&mut discarded)
            .map_err(|source| LoadError::Preamble {
                path: path.to_path_buf(),
                source,
            })?;
        if bytes == 0 {
            return Err(LoadError::MissingHeader {
                path: path.to_path_buf(),
                preamble: preamble_lines,
            });
        }
    }

    let mut csv_reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let parse_err = |source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let headers = csv_reader.headers().map_err(parse_err)?.clone();
    if headers.is_empty() {
        return Err(LoadError::MissingHeader {
            path: path.to_path_buf(),
            preamble: preamble_lines,
        });
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(parse_err)?;
        rows.push(headers.iter().zip(record.iter()).collect::<RowRecord>());
    }

    debug!(path = %path.display(), rows = rows.len(), columns = headers.len(), "Loaded CSV file");
    Ok(rows)
}
