//! Feature Deriver
//!
//! Computes the six prediction model inputs from translated sensor channels.
//! Every derived value is finite: blank, missing or non-numeric sources
//! count as zero.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::types::{fields, RowRecord};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y"];

/// Parse a historian timestamp. Offsets (RFC 3339) are normalised to the
/// wall-clock time they carry; bare dates resolve to midnight.
pub fn parse_row_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Whether the row carries a parseable `Date`.
pub fn has_valid_date(row: &RowRecord) -> bool {
    row.text(fields::DATE).and_then(parse_row_date).is_some()
}

/// Return a new record with the derived feature set added.
///
/// | derived field | source |
/// |---|---|
/// | total charge rate | conveyor 31 + conveyor 32 productivity |
/// | smelting-zone temperature | mean of melting zone points 1 and 2 |
/// | exhaust gas temperature | outgoing gas temperature |
/// | overall blast volume | blast furnace flow |
/// | oxygen enrichment | blast oxygen content |
/// | feeder 2 speed | feeder 2 speed, as a number |
pub fn derive_features(row: &RowRecord) -> RowRecord {
    let total_charge = row.number_or_zero(fields::CONVEYOR_31_PRODUCTIVITY)
        + row.number_or_zero(fields::CONVEYOR_32_PRODUCTIVITY);
    let smelting_zone = (row.number_or_zero(fields::MELTING_ZONE_POINT_1)
        + row.number_or_zero(fields::MELTING_ZONE_POINT_2))
        / 2.0;

    row.clone()
        .with(fields::TOTAL_CHARGE_RATE, finite_or_zero(total_charge))
        .with(fields::SMELTING_ZONE_TEMPERATURE, finite_or_zero(smelting_zone))
        .with(
            fields::EXHAUST_GAS_TEMPERATURE,
            row.number_or_zero(fields::OUTGOING_GAS_TEMPERATURE),
        )
        .with(
            fields::OVERALL_BLAST_VOLUME,
            row.number_or_zero(fields::BLAST_FURNACE_FLOW),
        )
        .with(
            fields::OXYGEN_ENRICHMENT,
            row.number_or_zero(fields::BLAST_OXYGEN_CONTENT),
        )
        .with(fields::FEEDER_2_SPEED, row.number_or_zero(fields::FEEDER_2_SPEED))
}

// Sums of huge finite values can still overflow to infinity.
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DERIVED: [&str; 6] = fields::MODEL_INPUTS;

    fn sample_row() -> RowRecord {
        RowRecord::new()
            .with(fields::DATE, "2023-03-01 08:00:00")
            .with(fields::CONVEYOR_31_PRODUCTIVITY, "12.5")
            .with(fields::CONVEYOR_32_PRODUCTIVITY, "7.3")
            .with(fields::MELTING_ZONE_POINT_1, "1210")
            .with(fields::MELTING_ZONE_POINT_2, "1190")
            .with(fields::OUTGOING_GAS_TEMPERATURE, "640.5")
            .with(fields::BLAST_FURNACE_FLOW, "24500")
            .with(fields::BLAST_OXYGEN_CONTENT, "62.1")
            .with(fields::FEEDER_2_SPEED, "31")
    }

    #[test]
    fn test_total_charge_rate_is_exact_sum() {
        let derived = derive_features(&sample_row());
        assert_eq!(derived.number(fields::TOTAL_CHARGE_RATE), Some(12.5 + 7.3));
        assert!((derived.number_or_zero(fields::TOTAL_CHARGE_RATE) - 19.8).abs() < 1e-9);
    }

    #[test]
    fn test_passthroughs_and_average() {
        let derived = derive_features(&sample_row());
        assert_eq!(derived.number(fields::SMELTING_ZONE_TEMPERATURE), Some(1200.0));
        assert_eq!(derived.number(fields::EXHAUST_GAS_TEMPERATURE), Some(640.5));
        assert_eq!(derived.number(fields::OVERALL_BLAST_VOLUME), Some(24500.0));
        assert_eq!(derived.number(fields::OXYGEN_ENRICHMENT), Some(62.1));
        assert_eq!(
            derived.get(fields::FEEDER_2_SPEED),
            Some(&crate::types::FieldValue::Number(31.0))
        );
        // raw channels are kept
        assert_eq!(derived.text(fields::BLAST_FURNACE_FLOW), Some("24500"));
    }

    #[test]
    fn test_missing_point_counts_as_zero_in_average() {
        let row = RowRecord::new().with(fields::MELTING_ZONE_POINT_1, "1200");
        let derived = derive_features(&row);
        assert_eq!(derived.number(fields::SMELTING_ZONE_TEMPERATURE), Some(600.0));
    }

    #[test]
    fn test_derived_fields_are_finite_for_garbage_input() {
        let inputs = [
            RowRecord::new(),
            RowRecord::new()
                .with(fields::CONVEYOR_31_PRODUCTIVITY, "n/a")
                .with(fields::CONVEYOR_32_PRODUCTIVITY, "")
                .with(fields::MELTING_ZONE_POINT_1, "NaN")
                .with(fields::MELTING_ZONE_POINT_2, "inf")
                .with(fields::OUTGOING_GAS_TEMPERATURE, "-")
                .with(fields::BLAST_FURNACE_FLOW, "12,5")
                .with(fields::FEEDER_2_SPEED, "fast"),
            RowRecord::new()
                .with(fields::CONVEYOR_31_PRODUCTIVITY, f64::MAX)
                .with(fields::CONVEYOR_32_PRODUCTIVITY, f64::MAX),
        ];
        for row in &inputs {
            let derived = derive_features(row);
            for name in DERIVED {
                let value = derived.number(name);
                assert!(
                    value.is_some_and(f64::is_finite),
                    "{name} not finite: {:?}",
                    derived.get(name)
                );
            }
        }
    }

    #[test]
    fn test_non_numeric_conveyor_keeps_the_other() {
        let row = RowRecord::new()
            .with(fields::CONVEYOR_31_PRODUCTIVITY, "broken")
            .with(fields::CONVEYOR_32_PRODUCTIVITY, "7.3");
        assert_eq!(derive_features(&row).number(fields::TOTAL_CHARGE_RATE), Some(7.3));
    }

    #[test]
    fn test_parse_row_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 3, 1)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();
        for raw in [
            "2023-03-01 08:15:00",
            "2023-03-01 08:15",
            "2023-03-01T08:15:00",
            "2023-03-01T08:15:00+03:00",
            "01.03.2023 08:15:00",
            "01.03.2023 08:15",
            "03/01/2023 08:15:00",
        ] {
            assert_eq!(parse_row_date(raw), Some(expected), "{raw}");
        }
        assert_eq!(
            parse_row_date("2023-03-01"),
            NaiveDate::from_ymd_opt(2023, 3, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
    }

    #[test]
    fn test_parse_row_date_rejects_invalid() {
        for raw in ["", "   ", "not a date", "2023-13-01 00:00:00", "31.02.2023 10:00"] {
            assert_eq!(parse_row_date(raw), None, "{raw}");
        }
    }

    #[test]
    fn test_has_valid_date() {
        assert!(has_valid_date(&sample_row()));
        assert!(!has_valid_date(&RowRecord::new()));
        assert!(!has_valid_date(&RowRecord::new().with(fields::DATE, "garbage")));
    }
}
