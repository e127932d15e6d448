//! Request and response bodies of the external prediction service

use serde::{Deserialize, Serialize};

use super::fields;

/// Body of `POST /predict` and `POST /recommend`: exactly the six model
/// inputs, serialised under their canonical names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(rename = "Total charge rate, t/h")]
    pub total_charge_rate: f64,
    #[serde(rename = "Overall blast volume, m3/h")]
    pub overall_blast_volume: f64,
    #[serde(rename = "Oxygen content in the blast (degree of oxygen enrichment in the blowing), %")]
    pub oxygen_enrichment: f64,
    #[serde(rename = "Temperature of exhaust gases in the off-gas duct, °C")]
    pub exhaust_gas_temperature: f64,
    #[serde(rename = "Temperature of feed in the smelting zone, °C")]
    pub smelting_zone_temperature: f64,
    #[serde(rename = "feeder 2, speed")]
    pub feeder_2_speed: f64,
}

impl PredictionRequest {
    /// Value of a model input by canonical name.
    pub fn get(&self, field: &str) -> Option<f64> {
        match field {
            fields::TOTAL_CHARGE_RATE => Some(self.total_charge_rate),
            fields::OVERALL_BLAST_VOLUME => Some(self.overall_blast_volume),
            fields::OXYGEN_ENRICHMENT => Some(self.oxygen_enrichment),
            fields::EXHAUST_GAS_TEMPERATURE => Some(self.exhaust_gas_temperature),
            fields::SMELTING_ZONE_TEMPERATURE => Some(self.smelting_zone_temperature),
            fields::FEEDER_2_SPEED => Some(self.feeder_2_speed),
            _ => None,
        }
    }
}

/// Body returned by `POST /predict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Predicted copper content in matte (%)
    pub prediction: f64,
}

/// A single operator recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub parameter: String,
    /// Direction to move the parameter, as worded by the service.
    pub action: String,
    pub current_value: f64,
    pub recommended_value: f64,
    pub change: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_limit: Option<String>,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} from {:.2} to {:.2} (change: {:.2})",
            self.parameter, self.action, self.current_value, self.recommended_value, self.change
        )
    }
}

/// Body returned by `POST /recommend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    /// Copper content the service estimated for the submitted inputs (%)
    pub current_cu: f64,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

/// Error body the service returns with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceErrorBody {
    pub error: String,
}
