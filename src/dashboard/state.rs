//! Dashboard state
//!
//! Everything the panel shows lives in one [`DashboardState`] owned by the
//! dashboard session task. Two inputs drive it: a pushed telemetry row
//! ([`DashboardState::accept_message`]) and an operator override
//! ([`DashboardState::accept_adjustment`]). Each starts one predict+recommend
//! [`PendingRound`] against a [`PredictionService`]; the round runs without
//! borrowing the state and lands through [`DashboardState::finish_round`].
//! `on_message` and `apply_adjustment` do all three steps in one await.

use chrono::{DateTime, Duration, Local};
use tracing::{debug, warn};

use super::adjustments::{AdjustableParameter, AdjustmentError, AdjustmentRanges, ManualAdjustments};
use super::client::{PredictionError, PredictionService};
use super::history::RollingHistory;
use crate::config::{defaults, DashboardConfig};
use crate::ingest::parse_row_date;
use crate::types::{fields, PredictionRequest, Recommendation, RowRecord};

// ============================================================================
// Display types
// ============================================================================

/// Telemetry subset charted on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayRecord {
    pub overall_blast_volume: f64,
    pub matte_siphon_temperature: f64,
    pub melting_zone_temperature: f64,
    pub natural_gas_flow: f64,
    pub feeder_2_speed: f64,
}

impl DisplayRecord {
    pub fn from_row(row: &RowRecord) -> Self {
        Self {
            overall_blast_volume: row.number_or_zero(fields::OVERALL_BLAST_VOLUME),
            matte_siphon_temperature: row.number_or_zero(fields::MATTE_SIPHON_TEMPERATURE),
            melting_zone_temperature: row.number_or_zero(fields::MELTING_ZONE_POINT_1),
            natural_gas_flow: row.number_or_zero(fields::NATURAL_GAS_FLOW),
            feeder_2_speed: row.number_or_zero(fields::FEEDER_2_SPEED),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryPoint {
    pub time: String,
    pub values: DisplayRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionPoint {
    pub time: String,
    pub cu: f64,
}

/// Snapshot shown in the "current values" block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CurrentValues {
    pub overall_blast_volume: f64,
    pub matte_siphon_temperature: f64,
    pub melting_zone_temperature: f64,
    pub natural_gas_flow: f64,
    pub feeder_2_speed: f64,
    pub predicted_cu: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Open,
    Closed,
}

// ============================================================================
// Request building
// ============================================================================

/// Live value, treating absent, non-numeric and zero alike.
fn live_or(row: &RowRecord, field: &str, fallback: f64) -> f64 {
    row.number(field).filter(|v| *v != 0.0).unwrap_or(fallback)
}

/// Build the model payload for `row`.
///
/// Adjustable parameters take the override, then the live value, then the
/// default; the other inputs take the live value, then the default.
pub fn build_request(row: &RowRecord, adjustments: &ManualAdjustments) -> PredictionRequest {
    let adjustable = |parameter: AdjustableParameter, fallback: f64| {
        adjustments
            .get(parameter)
            .unwrap_or_else(|| live_or(row, parameter.field_name(), fallback))
    };

    PredictionRequest {
        total_charge_rate: live_or(row, fields::TOTAL_CHARGE_RATE, defaults::FALLBACK_TOTAL_CHARGE_RATE),
        overall_blast_volume: adjustable(
            AdjustableParameter::OverallBlastVolume,
            defaults::FALLBACK_BLAST_VOLUME,
        ),
        oxygen_enrichment: live_or(row, fields::OXYGEN_ENRICHMENT, defaults::FALLBACK_OXYGEN_CONTENT),
        exhaust_gas_temperature: live_or(
            row,
            fields::EXHAUST_GAS_TEMPERATURE,
            defaults::FALLBACK_EXHAUST_TEMPERATURE,
        ),
        smelting_zone_temperature: live_or(
            row,
            fields::SMELTING_ZONE_TEMPERATURE,
            defaults::FALLBACK_SMELTING_TEMPERATURE,
        ),
        feeder_2_speed: adjustable(AdjustableParameter::Feeder2Speed, defaults::FALLBACK_FEEDER_SPEED),
    }
}

/// `HH:MM:SS` of the row's own timestamp, else of the arrival time.
fn time_label(row: &RowRecord, now: DateTime<Local>) -> String {
    row.text(fields::DATE)
        .and_then(parse_row_date)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| now.format("%H:%M:%S").to_string())
}

// ============================================================================
// State
// ============================================================================

pub struct DashboardState {
    telemetry: RollingHistory<TelemetryPoint>,
    predictions: RollingHistory<PredictionPoint>,
    current: Option<CurrentValues>,
    last_row: Option<RowRecord>,
    recommendations: Vec<Recommendation>,
    /// When the recommendation list was last replaced.
    recommendations_updated_at: Option<DateTime<Local>>,
    debounce: Duration,
    adjustments: ManualAdjustments,
    ranges: AdjustmentRanges,
    error: Option<String>,
    /// Last rejected override, kept apart from service and socket errors.
    input_error: Option<String>,
    connection: ConnectionStatus,
}

impl DashboardState {
    pub fn new(config: &DashboardConfig) -> Self {
        let debounce = i64::try_from(config.recommendation_debounce_ms)
            .ok()
            .and_then(Duration::try_milliseconds)
            .unwrap_or(Duration::MAX);
        Self {
            telemetry: RollingHistory::new(config.history_capacity),
            predictions: RollingHistory::new(config.history_capacity),
            current: None,
            last_row: None,
            recommendations: Vec::new(),
            recommendations_updated_at: None,
            debounce,
            adjustments: ManualAdjustments::default(),
            ranges: AdjustmentRanges::from(config),
            error: None,
            input_error: None,
            connection: ConnectionStatus::Connecting,
        }
    }

    // --- accessors used by the renderer ---

    pub fn telemetry(&self) -> &RollingHistory<TelemetryPoint> {
        &self.telemetry
    }

    pub fn predictions(&self) -> &RollingHistory<PredictionPoint> {
        &self.predictions
    }

    pub fn current(&self) -> Option<&CurrentValues> {
        self.current.as_ref()
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    /// Earliest time a telemetry round may replace the recommendations;
    /// `None` means the next successful round will.
    pub fn next_recommendation_at(&self) -> Option<DateTime<Local>> {
        self.recommendations_updated_at
            .and_then(|at| at.checked_add_signed(self.debounce))
    }

    fn recommendations_due(&self, now: DateTime<Local>) -> bool {
        self.recommendations_updated_at
            .map_or(true, |at| now.signed_duration_since(at) >= self.debounce)
    }

    pub fn adjustments(&self) -> &ManualAdjustments {
        &self.adjustments
    }

    pub fn ranges(&self) -> &AdjustmentRanges {
        &self.ranges
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn input_error(&self) -> Option<&str> {
        self.input_error.as_deref()
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn on_open(&mut self) {
        self.connection = ConnectionStatus::Open;
    }

    pub fn on_closed(&mut self) {
        self.connection = ConnectionStatus::Closed;
        self.error = Some("WebSocket connection closed".to_string());
    }

    pub fn on_socket_error(&mut self, message: &str) {
        self.error = Some(format!("WebSocket error: {message}"));
    }

    /// The payload the next round would send for the last live row.
    pub fn pending_request(&self) -> PredictionRequest {
        let empty = RowRecord::new();
        build_request(self.last_row.as_ref().unwrap_or(&empty), &self.adjustments)
    }

    /// Record one pushed telemetry message and return the round it starts.
    ///
    /// Telemetry history grows as soon as the row arrives; the prediction
    /// side only lands when the returned round is handed to
    /// [`finish_round`](Self::finish_round).
    pub fn accept_message(&mut self, text: &str, now: DateTime<Local>) -> Option<PendingRound> {
        let row: RowRecord = match serde_json::from_str(text) {
            Ok(row) => row,
            Err(e) => {
                warn!(error = %e, "Unparseable telemetry message");
                self.error = Some(format!("WebSocket message error: {e}"));
                return None;
            }
        };

        let time = time_label(&row, now);
        let display = DisplayRecord::from_row(&row);
        self.telemetry.push(TelemetryPoint {
            time: time.clone(),
            values: display,
        });

        let request = build_request(&row, &self.adjustments);
        self.last_row = Some(row);
        Some(PendingRound {
            trigger: RoundTrigger::Telemetry { time, display },
            request,
        })
    }

    /// Validate and pin an operator override, returning the round it starts.
    ///
    /// A rejected value leaves overrides and histories alone and is shown in
    /// the input error banner until the next accepted override.
    pub fn accept_adjustment(
        &mut self,
        parameter: AdjustableParameter,
        input: &str,
    ) -> Result<(f64, PendingRound), AdjustmentError> {
        let value = match self.ranges.validate(parameter, input) {
            Ok(value) => value,
            Err(e) => {
                self.input_error = Some(e.to_string());
                return Err(e);
            }
        };
        self.input_error = None;
        self.adjustments.set(parameter, value);
        let round = PendingRound {
            trigger: RoundTrigger::Override { parameter, value },
            request: self.pending_request(),
        };
        Ok((value, round))
    }

    /// Land a finished round.
    ///
    /// Telemetry rounds refresh recommendations only outside the debounce
    /// window; override rounds always replace them and restart the window.
    /// A failed round touches nothing but the error banner.
    pub fn finish_round(&mut self, round: CompletedRound, now: DateTime<Local>) {
        let CompletedRound {
            trigger,
            request,
            outcome,
        } = round;

        let (predicted, recommended) = match outcome {
            Ok(results) => results,
            Err(e) => {
                self.error = Some(match trigger {
                    RoundTrigger::Telemetry { .. } => {
                        warn!(error = %e, "Prediction round failed");
                        format!("Prediction or recommendation error: {}", e.detail())
                    }
                    RoundTrigger::Override { parameter, value } => {
                        warn!(%parameter, value, error = %e, "Prediction round for override failed");
                        format!("Prediction error: {}", e.detail())
                    }
                });
                return;
            }
        };

        match trigger {
            RoundTrigger::Telemetry { time, display } => {
                self.predictions.push(PredictionPoint {
                    time,
                    cu: predicted,
                });
                self.current = Some(CurrentValues {
                    overall_blast_volume: request.overall_blast_volume,
                    matte_siphon_temperature: display.matte_siphon_temperature,
                    melting_zone_temperature: display.melting_zone_temperature,
                    natural_gas_flow: display.natural_gas_flow,
                    feeder_2_speed: request.feeder_2_speed,
                    predicted_cu: predicted,
                });
                if self.recommendations_due(now) {
                    debug!(count = recommended.len(), "Recommendations refreshed");
                    self.recommendations = recommended;
                    self.recommendations_updated_at = Some(now);
                }
            }
            RoundTrigger::Override { parameter, value } => {
                self.predictions.push(PredictionPoint {
                    time: now.format("%H:%M:%S").to_string(),
                    cu: predicted,
                });
                let current = self.current.get_or_insert_with(CurrentValues::default);
                match parameter {
                    AdjustableParameter::OverallBlastVolume => current.overall_blast_volume = value,
                    AdjustableParameter::Feeder2Speed => current.feeder_2_speed = value,
                }
                current.predicted_cu = predicted;
                self.recommendations = recommended;
                self.recommendations_updated_at = Some(now);
            }
        }
        self.error = None;
    }

    /// Handle one pushed telemetry message and wait for its round.
    pub async fn on_message<S>(&mut self, text: &str, now: DateTime<Local>, service: &S)
    where
        S: PredictionService + ?Sized,
    {
        if let Some(round) = self.accept_message(text, now) {
            let completed = round.run(service).await;
            self.finish_round(completed, now);
        }
    }

    /// Apply an operator override and wait for its round.
    ///
    /// A failed round keeps the override and reports through the error
    /// banner.
    pub async fn apply_adjustment<S>(
        &mut self,
        parameter: AdjustableParameter,
        input: &str,
        now: DateTime<Local>,
        service: &S,
    ) -> Result<f64, AdjustmentError>
    where
        S: PredictionService + ?Sized,
    {
        let (value, round) = self.accept_adjustment(parameter, input)?;
        let completed = round.run(service).await;
        self.finish_round(completed, now);
        Ok(value)
    }
}

// ============================================================================
// Rounds
// ============================================================================

#[derive(Debug, Clone)]
enum RoundTrigger {
    Telemetry { time: String, display: DisplayRecord },
    Override { parameter: AdjustableParameter, value: f64 },
}

/// A predict+recommend round detached from the state that started it, so
/// the owner can keep handling events while it is in flight.
#[derive(Debug, Clone)]
pub struct PendingRound {
    trigger: RoundTrigger,
    request: PredictionRequest,
}

impl PendingRound {
    /// Predict and recommend concurrently; either failure discards both.
    pub async fn run<S>(self, service: &S) -> CompletedRound
    where
        S: PredictionService + ?Sized,
    {
        let (predicted, recommended) = tokio::join!(
            service.predict(&self.request),
            service.recommend(&self.request)
        );
        let outcome = match (predicted, recommended) {
            (Ok(predicted), Ok(recommended)) => {
                Ok((predicted.prediction, recommended.recommendations))
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        };
        CompletedRound {
            trigger: self.trigger,
            request: self.request,
            outcome,
        }
    }
}

/// Outcome of a [`PendingRound`], ready for [`DashboardState::finish_round`].
#[derive(Debug)]
pub struct CompletedRound {
    trigger: RoundTrigger,
    request: PredictionRequest,
    outcome: Result<(f64, Vec<Recommendation>), PredictionError>,
}

// ============================================================================
// Tests
// ============================================================================
