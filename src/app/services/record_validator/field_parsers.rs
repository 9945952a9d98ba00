//! Field parsing utilities for conversion rows
//!
//! Each parser returns `None` for input it cannot accept; the validator
//! decides which field and reason to report.

use crate::constants::click_id;
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

/// Offset-bearing formats accepted besides RFC 3339
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

static CLICK_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(click_id::PATTERN).expect("click id pattern is valid"));

/// Parse an ISO-8601-like date-time that carries an explicit offset
///
/// Accepts RFC 3339 (`2025-01-01T10:00:00+00:00`, `2025-01-01T10:00:00Z`)
/// and the space-separated upload format (`2025-12-19 10:30:00-08:00`).
/// Naive date-times are rejected: without an offset the conversion time
/// is ambiguous.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
}

/// Parse a non-negative decimal amount
pub fn parse_value(value: &str) -> Option<Decimal> {
    Decimal::from_str(value)
        .ok()
        .filter(|amount| *amount >= Decimal::ZERO)
}

/// Parse a 3-letter alphabetic currency code, normalised to upper case
pub fn parse_currency(value: &str) -> Option<String> {
    if value.len() == 3 && value.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(value.to_ascii_uppercase())
    } else {
        None
    }
}

/// Whether an id consists only of ASCII digits
pub fn is_numeric_id(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Whether an identifier has the shape of a provider click id
pub fn looks_like_click_id(value: &str) -> bool {
    (click_id::MIN_LEN..=click_id::MAX_LEN).contains(&value.len())
        && CLICK_ID_PATTERN.is_match(value)
}
