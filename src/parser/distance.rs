//! Distance offering parser
//!
//! Each distance is a `<button>` whose text is the label (`42.195K`,
//! `5K+10K`, `親子組`) and whose `title` attribute carries price and
//! capacity as full-width-colon separated fields:
//! `報名費：800<br/>名額：3000`.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::DistanceEntry;
use crate::utils::parse_leading_int;

static NUMERIC_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)K$").expect("Invalid regex pattern"));

static LINE_BREAK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|\n").expect("Invalid regex pattern"));

/// Field separator inside the `title` attribute
const FIELD_SEPARATOR: char = '：';

/// Parse one distance offering from its label and `title` attribute
///
/// Malformed price or limit fields come back as `None`; this never fails.
pub fn parse_distance(label: &str, title: Option<&str>) -> DistanceEntry {
    let label = label.trim();
    let (distance, complex_distance) = match parse_numeric_label(label) {
        Some(km) => (Some(km), None),
        None => (None, Some(label.to_string())),
    };

    let (event_price, event_limit) = title.map(parse_price_and_limit).unwrap_or_default();

    DistanceEntry {
        distance,
        complex_distance,
        event_price,
        event_limit,
    }
}

/// Kilometers for a clean `<number>K` label
fn parse_numeric_label(label: &str) -> Option<f64> {
    if label.contains('+') {
        return None;
    }
    NUMERIC_LABEL_REGEX
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Price is the second field up to the line break; limit is the third field
fn parse_price_and_limit(title: &str) -> (Option<i64>, Option<i64>) {
    let fields: Vec<&str> = title.split(FIELD_SEPARATOR).collect();

    let price = fields
        .get(1)
        .and_then(|field| LINE_BREAK_REGEX.split(field).next())
        .and_then(parse_leading_int);
    let limit = fields.get(2).and_then(|field| parse_leading_int(field));

    (price, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_numeric_distance() {
        let entry = parse_distance("42.195K", Some("報名費：1200<br/>名額：5000"));
        assert_eq!(entry.distance, Some(42.195));
        assert!(entry.complex_distance.is_none());
        assert_eq!(entry.event_price, Some(1200));
        assert_eq!(entry.event_limit, Some(5000));
    }

    #[test]
    fn test_integer_distance() {
        let entry = parse_distance(" 10K ", Some("報名費：600<br/>名額：2000"));
        assert_eq!(entry.distance, Some(10.0));
        assert!(entry.complex_distance.is_none());
    }

    #[test]
    fn test_plus_label_is_complex() {
        let entry = parse_distance("5K+10K", Some("報名費：900<br/>名額：100"));
        assert!(entry.distance.is_none());
        assert_eq!(entry.complex_distance.as_deref(), Some("5K+10K"));
    }

    #[test]
    fn test_text_label_is_complex() {
        let entry = parse_distance("親子組", None);
        assert!(entry.distance.is_none());
        assert_eq!(entry.complex_distance.as_deref(), Some("親子組"));
        assert!(entry.event_price.is_none());
        assert!(entry.event_limit.is_none());
    }

    #[test]
    fn test_non_numeric_price_keeps_limit() {
        let entry = parse_distance("21K", Some("報名費：洽主辦單位<br/>名額：3000"));
        assert_eq!(entry.distance, Some(21.0));
        assert!(entry.event_price.is_none());
        assert_eq!(entry.event_limit, Some(3000));
    }

    #[test]
    fn test_suffixed_values() {
        let entry = parse_distance("3K", Some("報名費：500元<br>名額：800人"));
        assert_eq!(entry.event_price, Some(500));
        assert_eq!(entry.event_limit, Some(800));
    }

    #[test]
    fn test_missing_limit_field() {
        let entry = parse_distance("3K", Some("報名費：500"));
        assert_eq!(entry.event_price, Some(500));
        assert!(entry.event_limit.is_none());
    }

    #[test]
    fn test_title_without_separator() {
        let entry = parse_distance("3K", Some("免費參加"));
        assert!(entry.event_price.is_none());
        assert!(entry.event_limit.is_none());
    }

    proptest! {
        #[test]
        fn prop_numeric_labels_set_distance(whole in 0u32..200, frac in proptest::option::of(0u32..1000)) {
            let label = match frac {
                Some(f) => format!("{whole}.{f}K"),
                None => format!("{whole}K"),
            };
            let entry = parse_distance(&label, None);
            prop_assert!(entry.distance.is_some());
            prop_assert!(entry.complex_distance.is_none());
        }

        #[test]
        fn prop_other_labels_keep_raw(label in "[^0-9]{1,12}") {
            let entry = parse_distance(&label, None);
            prop_assert!(entry.distance.is_none());
            prop_assert_eq!(entry.complex_distance, Some(label.trim().to_string()));
        }

        #[test]
        fn prop_plus_labels_are_complex(a in 1u32..50, b in 1u32..50) {
            let entry = parse_distance(&format!("{a}K+{b}K"), None);
            prop_assert!(entry.distance.is_none());
            prop_assert!(entry.complex_distance.is_some());
        }
    }
}
