//! Interactive dashboard session
//!
//! A single task `select!`s between pushed telemetry, operator commands and
//! finished prediction rounds, so [`DashboardState`] has exactly one writer.
//! The panel is redrawn after every event.

use chrono::Local;
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, SinkExt, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::adjustments::AdjustableParameter;
use super::client::PredictionService;
use super::render::render;
use super::state::{CompletedRound, DashboardState};
use crate::config::DashboardConfig;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

const HELP: &str = "blast <value>: pin overall blast volume | feeder <value>: pin feeder 2 speed | quit: exit";

/// Dashboard session errors
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One line of operator input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Adjust(AdjustableParameter, String),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match word.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => match AdjustableParameter::parse(other) {
            Some(parameter) => Command::Adjust(parameter, rest.trim().to_string()),
            None => Command::Unknown(line.to_string()),
        },
    }
}

async fn redraw<W>(output: &mut W, state: &DashboardState, notice: Option<&str>) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(CLEAR_SCREEN.as_bytes()).await?;
    output.write_all(render(state, notice).as_bytes()).await?;
    output.flush().await
}

/// Run the dashboard on the terminal: commands from stdin, panel on stdout.
pub async fn run_dashboard<S>(
    config: &DashboardConfig,
    service: &S,
    shutdown: CancellationToken,
) -> Result<DashboardState, DashboardError>
where
    S: PredictionService + ?Sized,
{
    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();
    run_dashboard_with(config, service, input, &mut output, shutdown).await
}

/// Connect to the telemetry stream and run until `quit`, `shutdown`, or
/// the input ending after the stream closed and every round has landed.
/// Returns the final state.
///
/// Rounds run in the background of the loop, so a slow or stalled
/// prediction service never holds up frames, commands or shutdown.
/// There is no reconnect: once the stream closes the panel stays up with
/// the close banner and overrides still trigger prediction rounds.
pub async fn run_dashboard_with<S, R, W>(
    config: &DashboardConfig,
    service: &S,
    input: R,
    output: &mut W,
    shutdown: CancellationToken,
) -> Result<DashboardState, DashboardError>
where
    S: PredictionService + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut state = DashboardState::new(config);
    redraw(output, &state, None).await?;

    let connected = tokio::select! {
        () = shutdown.cancelled() => return Ok(state),
        connected = connect_async(config.ws_url.as_str()) => connected,
    };
    let (ws_stream, _) = connected.map_err(|source| DashboardError::Connect {
        url: config.ws_url.clone(),
        source,
    })?;
    info!(url = %config.ws_url, "Connected to telemetry stream");
    state.on_open();

    let (mut write, mut read) = ws_stream.split();
    let mut lines = input.lines();
    let mut rounds: FuturesUnordered<LocalBoxFuture<'_, CompletedRound>> = FuturesUnordered::new();
    let mut socket_open = true;
    let mut input_open = true;
    let mut notice: Option<String> = None;
    redraw(output, &state, None).await?;

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,

            Some(completed) = rounds.next(), if !rounds.is_empty() => {
                state.finish_round(completed, Local::now());
            }

            msg = read.next(), if socket_open => match msg {
                Some(Ok(Message::Text(text))) => {
                    if let Some(round) = state.accept_message(&text, Local::now()) {
                        rounds.push(round.run(service).boxed_local());
                    }
                }
                Some(Ok(Message::Binary(bytes))) => {
                    let text = String::from_utf8_lossy(&bytes);
                    if let Some(round) = state.accept_message(&text, Local::now()) {
                        rounds.push(round.run(service).boxed_local());
                    }
                }
                Some(Ok(Message::Ping(payload))) => {
                    if let Err(e) = write.send(Message::Pong(payload)).await {
                        debug!(error = %e, "Pong not delivered");
                    }
                    continue;
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!("Telemetry stream closed");
                    socket_open = false;
                    state.on_closed();
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    warn!(error = %e, "Telemetry stream error");
                    socket_open = false;
                    state.on_socket_error(&e.to_string());
                }
            },

            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => {
                    notice = match parse_command(&line) {
                        Command::Adjust(parameter, input) => match state.accept_adjustment(parameter, &input) {
                            Ok((value, round)) => {
                                info!(%parameter, value, "Manual adjustment applied");
                                rounds.push(round.run(service).boxed_local());
                                Some(format!("{parameter} set to {value}"))
                            }
                            Err(e) => {
                                debug!(error = %e, "Manual adjustment rejected");
                                None
                            }
                        },
                        Command::Help => Some(HELP.to_string()),
                        Command::Quit => break,
                        Command::Empty => None,
                        Command::Unknown(line) => Some(format!("Unknown command '{line}'. {HELP}")),
                    };
                }
                Ok(None) => {
                    debug!("Command input closed");
                    input_open = false;
                }
                Err(e) => {
                    warn!(error = %e, "Command input failed");
                    input_open = false;
                }
            },
        }

        if !socket_open && !input_open && rounds.is_empty() {
            break;
        }
        redraw(output, &state, notice.as_deref()).await?;
    }

    if !rounds.is_empty() {
        debug!(in_flight = rounds.len(), "Dropping unfinished prediction rounds");
    }
    if socket_open {
        if let Err(e) = write.send(Message::Close(None)).await {
            debug!(error = %e, "Close frame not delivered");
        }
    }
    Ok(state)
}
