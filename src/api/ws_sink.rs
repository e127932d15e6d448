//! WebSocket adapter for [`RowSink`]

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::publisher::{RowSink, SinkError};
use crate::types::RowRecord;

/// Pushes rows as JSON text frames.
///
/// The read half is drained by a helper task whose only job is to notice
/// the peer leaving (Close frame, stream end or error). Clients are not
/// expected to send anything else.
pub struct WsRowSink {
    sender: SplitSink<WebSocket, Message>,
    peer_gone: CancellationToken,
    reader: JoinHandle<()>,
}

impl WsRowSink {
    pub fn new(socket: WebSocket) -> Self {
        let (sender, receiver) = socket.split();
        let peer_gone = CancellationToken::new();
        let reader = tokio::spawn(watch_peer(receiver, peer_gone.clone()));
        Self {
            sender,
            peer_gone,
            reader,
        }
    }

    /// Resolves once the peer has disconnected.
    pub async fn peer_gone(&self) {
        self.peer_gone.cancelled().await;
    }

    /// Send a Close frame if the peer is still there.
    pub async fn close(&mut self) {
        if !self.peer_gone.is_cancelled() {
            if let Err(e) = self.sender.send(Message::Close(None)).await {
                debug!(error = %e, "Close frame not delivered");
            }
        }
        self.peer_gone.cancel();
    }
}

impl Drop for WsRowSink {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn watch_peer(mut receiver: SplitStream<WebSocket>, peer_gone: CancellationToken) {
    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }
    peer_gone.cancel();
}

#[async_trait]
impl RowSink for WsRowSink {
    fn is_open(&self) -> bool {
        !self.peer_gone.is_cancelled()
    }

    async fn send_row(&mut self, row: &RowRecord) -> Result<(), SinkError> {
        if self.peer_gone.is_cancelled() {
            return Err(SinkError::Closed);
        }
        let json = serde_json::to_string(row)?;
        if let Err(e) = self.sender.send(Message::Text(json)).await {
            self.peer_gone.cancel();
            return Err(SinkError::Transport(e.to_string()));
        }
        Ok(())
    }

    async fn closed(&self) {
        self.peer_gone.cancelled().await;
    }
}
