//! Row Stream Publisher
//!
//! Every connection gets its own [`RowReplay`]: a private copy of the
//! dataset, a [`ReplayCursor`] and nothing shared with other connections.
//!
//! ```text
//! RUNNING ──(rows left, sink open)──► send row ──► wait interval ──► RUNNING
//!    │
//!    ├──(sink closed / send failed)──► STOPPED (ConnectionClosed)
//!    ├──(rows exhausted)─────────────► STOPPED (Exhausted)
//!    └──(process shutdown)───────────► STOPPED (Cancelled)
//! ```
//!
//! A closed connection is never resumed; a new connection replays from row 0.

pub mod session;

use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::types::RowRecord;

pub use session::{load_for_replay, run_session, SessionError, SessionOutcome};

// ============================================================================
// Sink abstraction
// ============================================================================

/// Error returned when a row could not be delivered.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("connection closed")]
    Closed,
    #[error("failed to encode row: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Where a replay pushes its rows.
///
/// The WebSocket adapter lives in `api::ws_sink`; tests use an in-memory
/// recorder.
#[async_trait]
pub trait RowSink: Send + Sync {
    /// Whether the peer is still connected. Checked before every row.
    fn is_open(&self) -> bool;

    /// Deliver one row as a single message.
    async fn send_row(&mut self, row: &RowRecord) -> Result<(), SinkError>;

    /// Resolves once the peer has gone away. Lets the inter-row delay end
    /// early; sinks without close notification never resolve.
    async fn closed(&self) {
        futures::future::pending::<()>().await;
    }
}

// ============================================================================
// Replay state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStatus {
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every row was delivered
    Exhausted,
    /// The peer closed, or a send failed
    ConnectionClosed,
    /// Process shutdown
    Cancelled,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Exhausted => write!(f, "exhausted"),
            StopReason::ConnectionClosed => write!(f, "connection closed"),
            StopReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Position of one connection's replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayCursor {
    pub position: usize,
    pub status: ReplayStatus,
}

impl ReplayCursor {
    pub const fn start() -> Self {
        Self {
            position: 0,
            status: ReplayStatus::Running,
        }
    }

    fn stop(&mut self) {
        self.status = ReplayStatus::Stopped;
    }
}

/// Final summary of one replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    pub rows_sent: usize,
    pub total_rows: usize,
    pub reason: StopReason,
}

// ============================================================================
// Replay loop
// ============================================================================

/// Replays an owned row sequence to a single sink at a fixed cadence.
pub struct RowReplay {
    rows: Vec<RowRecord>,
    interval: Duration,
    cursor: ReplayCursor,
    shutdown: CancellationToken,
}

impl RowReplay {
    pub fn new(rows: Vec<RowRecord>, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            rows,
            interval,
            cursor: ReplayCursor::start(),
            shutdown,
        }
    }

    pub const fn cursor(&self) -> ReplayCursor {
        self.cursor
    }

    /// Push rows until the dataset is exhausted, the sink closes or the
    /// process shuts down.
    ///
    /// Rows go out strictly in sequence order. The sink's open state is
    /// checked at the top of every iteration; a failed send counts as a
    /// close, never as a fault.
    pub async fn run<S: RowSink + ?Sized>(mut self, sink: &mut S) -> ReplayReport {
        let total_rows = self.rows.len();

        let reason = loop {
            if self.shutdown.is_cancelled() {
                break StopReason::Cancelled;
            }
            let Some(row) = self.rows.get(self.cursor.position) else {
                break StopReason::Exhausted;
            };
            if !sink.is_open() {
                info!(position = self.cursor.position, "Connection closed, stopping replay");
                break StopReason::ConnectionClosed;
            }
            if let Err(e) = sink.send_row(row).await {
                debug!(position = self.cursor.position, error = %e, "Row send failed, stopping replay");
                break StopReason::ConnectionClosed;
            }
            self.cursor.position += 1;

            if self.cursor.position < total_rows && !self.interval.is_zero() {
                tokio::select! {
                    () = tokio::time::sleep(self.interval) => {}
                    () = self.shutdown.cancelled() => {}
                    () = sink.closed() => {}
                }
            }
        };

        self.cursor.stop();
        ReplayReport {
            rows_sent: self.cursor.position,
            total_rows,
            reason,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
