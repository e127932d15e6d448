//! Canonical (English) field names.
//!
//! Raw sensor columns arrive under their translated names (see
//! `ingest::translator`); derived model inputs use the long names the
//! prediction model was trained on.

/// Row timestamp column.
pub const DATE: &str = "Date";

// === Raw sensor channels ===

pub const CONVEYOR_31_PRODUCTIVITY: &str = "conveyor 31, productivity";
pub const CONVEYOR_32_PRODUCTIVITY: &str = "conveyor 32, productivity";
pub const MELTING_ZONE_POINT_1: &str = "temperature of the feed, melting zone, point 1";
pub const MELTING_ZONE_POINT_2: &str = "temperature of the feed, melting zone, point 2";
pub const MATTE_SIPHON_TEMPERATURE: &str = "temperature of the feed, matte siphon";
pub const OUTGOING_GAS_TEMPERATURE: &str = "temperature of outgoing gases in the bunker";
pub const BLAST_FURNACE_FLOW: &str = "blast furnace flow";
pub const BLAST_OXYGEN_CONTENT: &str = "oxygen content in the blast furnace";
pub const NATURAL_GAS_FLOW: &str = "natural gas flow";

// === Model inputs (derived) ===

pub const TOTAL_CHARGE_RATE: &str = "Total charge rate, t/h";
pub const SMELTING_ZONE_TEMPERATURE: &str = "Temperature of feed in the smelting zone, °C";
pub const EXHAUST_GAS_TEMPERATURE: &str = "Temperature of exhaust gases in the off-gas duct, °C";
pub const OVERALL_BLAST_VOLUME: &str = "Overall blast volume, m3/h";
pub const OXYGEN_ENRICHMENT: &str =
    "Oxygen content in the blast (degree of oxygen enrichment in the blowing), %";
pub const FEEDER_2_SPEED: &str = "feeder 2, speed";

/// The six prediction model inputs, in the order the model expects them.
pub const MODEL_INPUTS: [&str; 6] = [
    TOTAL_CHARGE_RATE,
    OVERALL_BLAST_VOLUME,
    OXYGEN_ENRICHMENT,
    EXHAUST_GAS_TEMPERATURE,
    SMELTING_ZONE_TEMPERATURE,
    FEEDER_2_SPEED,
];
