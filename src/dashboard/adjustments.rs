//! Manual parameter overrides entered by the operator.

use crate::config::{DashboardConfig, ParameterRange};
use crate::types::fields;

/// The two parameters an operator may pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdjustableParameter {
    OverallBlastVolume,
    Feeder2Speed,
}

impl AdjustableParameter {
    pub const ALL: [Self; 2] = [Self::OverallBlastVolume, Self::Feeder2Speed];

    /// Canonical field name the override replaces.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::OverallBlastVolume => fields::OVERALL_BLAST_VOLUME,
            Self::Feeder2Speed => fields::FEEDER_2_SPEED,
        }
    }

    /// Short keyword used on the dashboard command line.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::OverallBlastVolume => "blast",
            Self::Feeder2Speed => "feeder",
        }
    }

    /// Accepts the keyword or the canonical field name.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.keyword().eq_ignore_ascii_case(name) || p.field_name() == name)
    }
}

impl std::fmt::Display for AdjustableParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Rejected override input. Nothing is changed when this is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdjustmentError {
    #[error("Invalid value for {parameter}: '{input}' is not a number (must be between {} and {})", .range.min, .range.max)]
    NotANumber {
        parameter: AdjustableParameter,
        input: String,
        range: ParameterRange,
    },
    #[error("Invalid value for {parameter}: must be between {} and {}", .range.min, .range.max)]
    OutOfRange {
        parameter: AdjustableParameter,
        value: f64,
        range: ParameterRange,
    },
}

/// Per-parameter accepted ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentRanges {
    pub blast_volume: ParameterRange,
    pub feeder_speed: ParameterRange,
}

impl AdjustmentRanges {
    pub const fn range(&self, parameter: AdjustableParameter) -> ParameterRange {
        match parameter {
            AdjustableParameter::OverallBlastVolume => self.blast_volume,
            AdjustableParameter::Feeder2Speed => self.feeder_speed,
        }
    }

    /// Parse and range-check operator input.
    pub fn validate(&self, parameter: AdjustableParameter, input: &str) -> Result<f64, AdjustmentError> {
        let range = self.range(parameter);
        let value = crate::types::parse_number(input).ok_or_else(|| AdjustmentError::NotANumber {
            parameter,
            input: input.trim().to_string(),
            range,
        })?;
        if !range.contains(value) {
            return Err(AdjustmentError::OutOfRange {
                parameter,
                value,
                range,
            });
        }
        Ok(value)
    }
}

impl Default for AdjustmentRanges {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

impl From<&DashboardConfig> for AdjustmentRanges {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            blast_volume: config.blast_volume_range,
            feeder_speed: config.feeder_speed_range,
        }
    }
}

/// Active overrides. Only ever set, never cleared, for the life of the process.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualAdjustments {
    blast_volume: Option<f64>,
    feeder_speed: Option<f64>,
}

impl ManualAdjustments {
    pub const fn get(&self, parameter: AdjustableParameter) -> Option<f64> {
        match parameter {
            AdjustableParameter::OverallBlastVolume => self.blast_volume,
            AdjustableParameter::Feeder2Speed => self.feeder_speed,
        }
    }

    pub fn set(&mut self, parameter: AdjustableParameter, value: f64) {
        match parameter {
            AdjustableParameter::OverallBlastVolume => self.blast_volume = Some(value),
            AdjustableParameter::Feeder2Speed => self.feeder_speed = Some(value),
        }
    }
}
