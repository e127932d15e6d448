//! One connection's lifetime: load the dataset, then replay it.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::{ReplayReport, RowReplay, RowSink};
use crate::config::ReplayConfig;
use crate::ingest::{load_dataset, Dataset, DatasetError};

/// Why a session could not start its replay.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("dataset load task did not complete: {0}")]
    LoadTask(#[from] tokio::task::JoinError),
}

/// How a connection session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The dataset loaded and the replay ran to one of its stop states.
    Replayed(ReplayReport),
    /// Loading failed; nothing was sent.
    LoadFailed(SessionError),
}

/// Load the configured dataset on the blocking pool.
pub async fn load_for_replay(config: &ReplayConfig) -> Result<Dataset, SessionError> {
    let files = config.data_files.clone();
    let preamble = config.preamble_lines;
    let dataset = tokio::task::spawn_blocking(move || load_dataset(&files, preamble)).await??;
    Ok(dataset)
}

/// Serve one connection: fresh dataset load, then a replay from row 0.
///
/// Load errors are logged and leave the sink untouched.
pub async fn run_session<S: RowSink + ?Sized>(
    sink: &mut S,
    config: &ReplayConfig,
    shutdown: CancellationToken,
) -> SessionOutcome {
    let dataset = match load_for_replay(config).await {
        Ok(dataset) => dataset,
        Err(e) => {
            error!(error = %e, "Error in data preprocessing, connection gets no data");
            return SessionOutcome::LoadFailed(e);
        }
    };

    info!(rows = dataset.len(), interval_ms = config.interval_ms, "Starting replay");
    let report = RowReplay::new(
        dataset.rows,
        Duration::from_millis(config.interval_ms),
        shutdown,
    )
    .run(sink)
    .await;

    info!(
        rows_sent = report.rows_sent,
        total_rows = report.total_rows,
        reason = %report.reason,
        "Replay finished"
    );
    SessionOutcome::Replayed(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::tests::RecordingSink;
    use crate::publisher::StopReason;
    use crate::types::fields;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    fn write_source(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "preamble\npreamble\nдата,расход КВС\n{body}").unwrap();
        path
    }

    fn config_for(files: Vec<PathBuf>) -> ReplayConfig {
        ReplayConfig {
            data_files: files,
            interval_ms: 0,
            preamble_lines: 2,
        }
    }

    #[tokio::test]
    async fn test_session_replays_loaded_rows() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_source(dir.path(), "a.csv", "2023-01-01 00:00:00,100\n");
        let b = write_source(dir.path(), "b.csv", "2023-01-01 00:00:01,200\nbad,300\n");

        let mut sink = RecordingSink::new();
        let outcome = run_session(&mut sink, &config_for(vec![a, b]), CancellationToken::new()).await;

        match outcome {
            SessionOutcome::Replayed(report) => {
                assert_eq!(report.reason, StopReason::Exhausted);
                assert_eq!(report.rows_sent, 2);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(sink.sent[1].number(fields::OVERALL_BLAST_VOLUME), Some(200.0));
    }

    #[tokio::test]
    async fn test_load_failure_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_source(dir.path(), "a.csv", "2023-01-01 00:00:00,100\n");
        let missing = dir.path().join("missing.csv");

        let mut sink = RecordingSink::new();
        let outcome = run_session(
            &mut sink,
            &config_for(vec![good, missing]),
            CancellationToken::new(),
        )
        .await;

        assert!(matches!(outcome, SessionOutcome::LoadFailed(_)));
        assert!(sink.sent.is_empty());
    }

    #[tokio::test]
    async fn test_each_session_restarts_from_first_row() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_source(
            dir.path(),
            "a.csv",
            "2023-01-01 00:00:00,1\n2023-01-01 00:00:01,2\n2023-01-01 00:00:02,3\n",
        );
        let config = config_for(vec![a]);

        let mut first = RecordingSink::new();
        first.close_after = Some(2);
        run_session(&mut first, &config, CancellationToken::new()).await;

        let mut second = RecordingSink::new();
        run_session(&mut second, &config, CancellationToken::new()).await;

        assert_eq!(first.sent.len(), 2);
        assert_eq!(second.sent.len(), 3);
        assert_eq!(second.sent[0], first.sent[0]);
    }
}
