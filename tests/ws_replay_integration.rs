//! WebSocket Replay Integration Test
//!
//! Binds the real router on an ephemeral port and connects with a
//! `tokio-tungstenite` client, the way the dashboard does.

use furnace_telemetry::api::{create_app, StreamState};
use furnace_telemetry::config::ReplayConfig;
use furnace_telemetry::types::{fields, RowRecord};

use futures::{SinkExt, StreamExt};
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn write_export(dir: &Path, name: &str, flows: &[u32]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "meta\nmeta\nдата,расход КВС").unwrap();
    for (i, flow) in flows.iter().enumerate() {
        writeln!(file, "2023-03-01 08:00:{i:02},{flow}").unwrap();
    }
    path
}

async fn spawn_server(replay: ReplayConfig) -> (SocketAddr, StreamState, CancellationToken) {
    let shutdown = CancellationToken::new();
    let state = StreamState::new(replay, shutdown.clone());
    let app = create_app(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let token = shutdown.clone();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await
            .unwrap();
    });
    (addr, state, shutdown)
}

/// Next row, or `None` once the server closed the stream.
async fn next_row<S>(read: &mut S) -> Option<RowRecord>
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, read.next())
            .await
            .expect("timed out waiting for a message");
        match msg {
            Some(Ok(Message::Text(text))) => return Some(serde_json::from_str(&text).unwrap()),
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return None,
            Some(Ok(_)) => continue,
        }
    }
}

fn flow(row: &RowRecord) -> f64 {
    row.number_or_zero(fields::OVERALL_BLAST_VOLUME)
}

#[tokio::test]
async fn test_client_receives_every_row_in_order_then_close() {
    let dir = tempfile::tempdir().unwrap();
    let replay = ReplayConfig {
        data_files: vec![
            write_export(dir.path(), "data1.csv", &[101, 102]),
            write_export(dir.path(), "data2.csv", &[201]),
        ],
        interval_ms: 10,
        preamble_lines: 2,
    };
    let (addr, state, shutdown) = spawn_server(replay).await;

    let (ws, _) = connect_async(format!("ws://{addr}/")).await.unwrap();
    let (_write, mut read) = ws.split();

    let mut flows = Vec::new();
    while let Some(row) = next_row(&mut read).await {
        assert!(row.contains_key(fields::TOTAL_CHARGE_RATE));
        flows.push(flow(&row));
    }
    assert_eq!(flows, vec![101.0, 102.0, 201.0]);
    assert_eq!(state.connections_accepted(), 1);

    shutdown.cancel();
}

#[tokio::test]
async fn test_each_connection_replays_from_the_first_row() {
    let dir = tempfile::tempdir().unwrap();
    let replay = ReplayConfig {
        data_files: vec![write_export(dir.path(), "data1.csv", &[1, 2, 3, 4, 5, 6])],
        interval_ms: 20,
        preamble_lines: 2,
    };
    let (addr, state, shutdown) = spawn_server(replay).await;

    // first client leaves after two rows
    let (ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    let (mut write, mut read) = ws.split();
    assert_eq!(next_row(&mut read).await.map(|r| flow(&r)), Some(1.0));
    assert_eq!(next_row(&mut read).await.map(|r| flow(&r)), Some(2.0));
    write.send(Message::Close(None)).await.unwrap();
    drop(read);
    drop(write);

    // second client gets its own replay from row 0
    let (ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    let (_write, mut read) = ws.split();
    assert_eq!(next_row(&mut read).await.map(|r| flow(&r)), Some(1.0));
    assert_eq!(next_row(&mut read).await.map(|r| flow(&r)), Some(2.0));
    assert_eq!(state.connections_accepted(), 2);

    shutdown.cancel();
}

#[tokio::test]
async fn test_load_failure_sends_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let replay = ReplayConfig {
        data_files: vec![dir.path().join("missing.csv")],
        interval_ms: 10,
        preamble_lines: 2,
    };
    let (addr, _state, shutdown) = spawn_server(replay).await;

    let (ws, _) = connect_async(format!("ws://{addr}/")).await.unwrap();
    let (_write, mut read) = ws.split();

    // nothing arrives while the socket stays open
    let waited = tokio::time::timeout(Duration::from_millis(200), read.next()).await;
    assert!(waited.is_err(), "unexpected message: {waited:?}");

    // shutdown closes the idle connection
    shutdown.cancel();
    assert!(next_row(&mut read).await.is_none());
}
