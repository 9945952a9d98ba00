//! Tests for individual field parsers

use crate::app::services::record_validator::field_parsers::*;
use chrono::Timelike;
use rust_decimal::Decimal;
use std::str::FromStr;

#[test]
fn test_parse_timestamp_accepts_offset_forms() {
    let rfc = parse_timestamp("2025-01-01T10:00:00+00:00").unwrap();
    assert_eq!(rfc.hour(), 10);

    let zulu = parse_timestamp("2025-01-01T10:00:00Z").unwrap();
    assert_eq!(zulu, rfc);

    let spaced = parse_timestamp("2025-12-19 10:30:00-08:00").unwrap();
    assert_eq!(spaced.offset().local_minus_utc(), -8 * 3600);

    let compact = parse_timestamp("2025-12-19 10:30:00-0800").unwrap();
    assert_eq!(compact, spaced);

    assert!(parse_timestamp("2025-01-01T10:00:00.250+01:00").is_some());
}

#[test]
fn test_parse_timestamp_rejects_missing_offset_and_garbage() {
    assert!(parse_timestamp("2025-01-01T10:00:00").is_none());
    assert!(parse_timestamp("2025-01-01 10:00:00").is_none());
    assert!(parse_timestamp("2025-01-01").is_none());
    assert!(parse_timestamp("bad-date").is_none());
    assert!(parse_timestamp("2025-13-01T10:00:00+00:00").is_none());
}

#[test]
fn test_parse_value() {
    assert_eq!(parse_value("50"), Some(Decimal::from(50)));
    assert_eq!(parse_value("0"), Some(Decimal::ZERO));
    assert_eq!(parse_value("4500.75"), Decimal::from_str("4500.75").ok());
    assert_eq!(parse_value("-5"), None);
    assert_eq!(parse_value("NaN"), None);
    assert_eq!(parse_value("inf"), None);
    assert_eq!(parse_value("1,000"), None);
    assert_eq!(parse_value("abc"), None);
}

#[test]
fn test_parse_currency() {
    assert_eq!(parse_currency("usd"), Some("USD".to_string()));
    assert_eq!(parse_currency("EUR"), Some("EUR".to_string()));
    assert_eq!(parse_currency("US"), None);
    assert_eq!(parse_currency("EURO"), None);
    assert_eq!(parse_currency("U5D"), None);
}

#[test]
fn test_numeric_ids() {
    assert!(is_numeric_id("987654321"));
    assert!(!is_numeric_id(""));
    assert!(!is_numeric_id("98765x"));
}

#[test]
fn test_click_id_shape() {
    assert!(looks_like_click_id("CjwKCAiA1KL3BRA8EiwAzCfbQxyz123abc"));
    assert!(looks_like_click_id("EAIaIQobChMI-xyz_987654321"));
    assert!(!looks_like_click_id("abc123"));
    assert!(!looks_like_click_id("Cj@#$%^&*()Cj@#$%^&*()"));
    assert!(!looks_like_click_id(&"a".repeat(201)));
}
