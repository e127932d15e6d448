//! Column Translator
//!
//! Maps the plant historian's Russian column headers to canonical English
//! field names. Unmapped headers pass through unchanged.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::types::RowRecord;

/// Source header → canonical field name.
pub const COLUMN_TRANSLATIONS: [(&str, &str); 42] = [
    ("номер измерения", "Measurement ID"),
    ("дата", "Date"),
    ("давление КВС, точка1", "blast furnace pressure, point 1"),
    ("давление КВС, точка2", "blast furnace pressure, point 2"),
    ("давление природный газ", "natural gas pressure"),
    ("конвейер 31, производительность", "conveyor 31, productivity"),
    ("конвейер 31, скорость", "conveyor 31, speed"),
    ("конвейер 32, производительность", "conveyor 32, productivity"),
    ("конвейер 32, скорость", "conveyor 32, speed"),
    ("питатель1, уровень", "feeder 1, level"),
    ("питатель1, скорость", "feeder 1, speed"),
    ("питатель1, производительность", "feeder 1, productivity"),
    ("питатель2, уровень", "feeder 2, level"),
    ("питатель2, скорость", "feeder 2, speed"),
    ("питатель2, производительность", "feeder 2, productivity"),
    ("питатель3, уровень", "feeder 3, level"),
    ("питатель3, скорость", "feeder 3, speed"),
    ("питатель3, производительность", "feeder 3, productivity"),
    ("питатель4, уровень", "feeder 4, level"),
    ("питатель4, скорость", "feeder 4, speed"),
    ("питатель4, производительность", "feeder 4, productivity"),
    ("питатель5, уровень", "feeder 5, level"),
    ("питатель5, скорость", "feeder 5, speed"),
    ("питатель5, производительность", "feeder 5, productivity"),
    ("питатель6, уровень", "feeder 6, level"),
    ("питатель6, скорость", "feeder 6, speed"),
    ("питатель6, производительность", "feeder 6, productivity"),
    ("питатель7, скорость", "feeder 7, speed"),
    ("питатель8, скорость", "feeder 8, speed"),
    ("питатель7, уровень", "feeder 7, level"),
    ("питатель8, уровень", "feeder 8, level"),
    ("разрежение в аптейке", "vacuum in the bunker"),
    ("расход КВС", "blast furnace flow"),
    ("расход природного газа", "natural gas flow"),
    ("содержание кислорода в КВС", "oxygen content in the blast furnace"),
    ("температура КВС", "blast furnace temperature"),
    ("температура отходящих газов в аптейке", "temperature of outgoing gases in the bunker"),
    ("температура пода, шлаковый сифон", "temperature of the feed, slag siphon"),
    ("температура пода, штейновый сифон", "temperature of the feed, matte siphon"),
    ("температура пода, зона плавления, точка1", "temperature of the feed, melting zone, point 1"),
    ("температура пода, зона плавления, точка2", "temperature of the feed, melting zone, point 2"),
    ("температура природного газа", "temperature of natural gas"),
];

fn lookup() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| COLUMN_TRANSLATIONS.iter().copied().collect())
}

/// Canonical name for a raw header, or the header itself when unmapped.
///
/// Surrounding whitespace is ignored for the lookup only; an unmapped
/// header is returned verbatim.
pub fn canonical_name(raw: &str) -> &str {
    translation(raw).unwrap_or(raw)
}

/// Canonical name for a raw header, `None` when the header is not in the table.
pub fn translation(raw: &str) -> Option<&'static str> {
    lookup().get(raw.trim()).copied()
}

/// Produce a new record with every key translated.
///
/// If a translated key collides with a key already present under its
/// canonical name, the translated column wins.
pub fn translate_row(raw: &RowRecord) -> RowRecord {
    let mut passthrough = Vec::new();
    let mut translated = Vec::new();
    for (key, value) in raw.iter() {
        match translation(key) {
            Some(name) => translated.push((name, value.clone())),
            None => passthrough.push((key, value.clone())),
        }
    }
    passthrough.into_iter().chain(translated).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fields;

    #[test]
    fn test_table_has_unique_sources_and_targets() {
        let sources: std::collections::HashSet<_> =
            COLUMN_TRANSLATIONS.iter().map(|(s, _)| *s).collect();
        let targets: std::collections::HashSet<_> =
            COLUMN_TRANSLATIONS.iter().map(|(_, t)| *t).collect();
        assert_eq!(sources.len(), COLUMN_TRANSLATIONS.len());
        assert_eq!(targets.len(), COLUMN_TRANSLATIONS.len());
    }

    #[test]
    fn test_known_headers_translate() {
        assert_eq!(canonical_name("дата"), fields::DATE);
        assert_eq!(canonical_name("расход КВС"), fields::BLAST_FURNACE_FLOW);
        assert_eq!(canonical_name(" питатель2, скорость "), fields::FEEDER_2_SPEED);
        assert_eq!(
            canonical_name("конвейер 31, производительность"),
            fields::CONVEYOR_31_PRODUCTIVITY
        );
    }

    #[test]
    fn test_unmapped_and_canonical_keys_pass_through() {
        assert_eq!(canonical_name("Date"), "Date");
        assert_eq!(canonical_name("custom column"), "custom column");

        let raw = RowRecord::new()
            .with("дата", "2023-01-01 00:00")
            .with("feeder 2, speed", "31")
            .with("operator note", "ok");
        let out = translate_row(&raw);
        assert_eq!(out.len(), raw.len());
        assert_eq!(out.text("Date"), Some("2023-01-01 00:00"));
        assert_eq!(out.text("feeder 2, speed"), Some("31"));
        assert_eq!(out.text("operator note"), Some("ok"));
        assert!(!out.contains_key("дата"));
    }

    #[test]
    fn test_translation_is_idempotent() {
        let raw: RowRecord = COLUMN_TRANSLATIONS
            .iter()
            .map(|(source, _)| (*source, "1"))
            .collect();
        let once = translate_row(&raw);
        let twice = translate_row(&once);
        assert_eq!(once, twice);
        assert_eq!(once.len(), COLUMN_TRANSLATIONS.len());
    }

    #[test]
    fn test_translated_column_wins_on_collision() {
        let raw = RowRecord::new()
            .with("Date", "stale")
            .with("дата", "2023-05-01 10:00");
        let out = translate_row(&raw);
        assert_eq!(out.text("Date"), Some("2023-05-01 10:00"));
    }
}
