//! Text rendering of the dashboard panel.

use std::fmt::Write;

use super::adjustments::AdjustableParameter;
use super::state::{ConnectionStatus, DashboardState, DisplayRecord};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const LABEL_WIDTH: usize = 24;

/// One-line chart of `values`, scaled between their own min and max.
pub fn sparkline(values: &[f64]) -> String {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let span = max - min;
    values
        .iter()
        .map(|v| {
            if !span.is_finite() || span <= 0.0 {
                return SPARK_LEVELS[0];
            }
            let level = ((v - min) / span * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

fn series_line(out: &mut String, label: &str, values: &[f64]) {
    let last = values.last().map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
    let _ = writeln!(out, "  {label:<LABEL_WIDTH$} {last:>10}  {}", sparkline(values));
}

/// Render the full panel. `notice` is a one-off status line (command
/// feedback) shown under the header.
pub fn render(state: &DashboardState, notice: Option<&str>) -> String {
    let mut out = String::new();

    let connection = match state.connection() {
        ConnectionStatus::Connecting => "connecting",
        ConnectionStatus::Open => "live",
        ConnectionStatus::Closed => "disconnected",
    };
    let _ = writeln!(out, "Furnace telemetry dashboard [{connection}]");
    if let Some(error) = state.error() {
        let _ = writeln!(out, "ERROR: {error}");
    }
    if let Some(error) = state.input_error() {
        let _ = writeln!(out, "INPUT ERROR: {error}");
    }
    if let Some(notice) = notice {
        let _ = writeln!(out, "> {notice}");
    }

    // Telemetry charts
    let _ = writeln!(out, "\nTelemetry ({} points)", state.telemetry().len());
    if let (Some(first), Some(last)) = (state.telemetry().oldest(), state.telemetry().latest()) {
        let _ = writeln!(out, "  {} .. {}", first.time, last.time);
    }
    let series = |pick: fn(&DisplayRecord) -> f64| -> Vec<f64> {
        state.telemetry().iter().map(|p| pick(&p.values)).collect()
    };
    series_line(&mut out, "Blast volume", &series(|d| d.overall_blast_volume));
    series_line(&mut out, "Matte siphon temp", &series(|d| d.matte_siphon_temperature));
    series_line(&mut out, "Melting zone temp", &series(|d| d.melting_zone_temperature));
    series_line(&mut out, "Natural gas flow", &series(|d| d.natural_gas_flow));
    series_line(&mut out, "Feeder 2 speed", &series(|d| d.feeder_2_speed));

    let cu: Vec<f64> = state.predictions().iter().map(|p| p.cu).collect();
    let _ = writeln!(out, "\nPredicted Cu in matte ({} points)", cu.len());
    series_line(&mut out, "Cu, %", &cu);

    // Current values
    let _ = writeln!(out, "\nCurrent values");
    match state.current() {
        Some(current) => {
            let rows = [
                ("Blast volume, m3/h", current.overall_blast_volume),
                ("Matte siphon temp, °C", current.matte_siphon_temperature),
                ("Melting zone temp, °C", current.melting_zone_temperature),
                ("Natural gas flow", current.natural_gas_flow),
                ("Feeder 2 speed", current.feeder_2_speed),
                ("Predicted Cu, %", current.predicted_cu),
            ];
            for (label, value) in rows {
                let _ = writeln!(out, "  {label:<LABEL_WIDTH$} {value:>10.2}");
            }
        }
        None => {
            let _ = writeln!(out, "  waiting for first prediction");
        }
    }

    // Recommendations
    let _ = writeln!(out, "\nRecommendations");
    if state.recommendations().is_empty() {
        let _ = writeln!(out, "  none");
    }
    for recommendation in state.recommendations() {
        let _ = writeln!(out, "  - {recommendation}");
    }

    // Adjustment panel
    let _ = writeln!(out, "\nManual adjustments");
    for parameter in AdjustableParameter::ALL {
        let range = state.ranges().range(parameter);
        let active = state
            .adjustments()
            .get(parameter)
            .map_or_else(|| "live".to_string(), |v| format!("{v}"));
        let _ = writeln!(
            out,
            "  {:<7} {:<LABEL_WIDTH$} {active:>8}  [{}, {}]",
            parameter.keyword(),
            parameter.field_name(),
            range.min,
            range.max
        );
    }
    let _ = writeln!(out, "\nCommands: blast <value> | feeder <value> | help | quit");
    out
}
