//! Test utilities for record validation

use crate::app::models::RawRow;

mod field_parser_tests;

pub const CLICK_ID: &str = "CjwKCAiA1KL3BRA8EiwAzCfbQxyz123abc";

/// Build a row from (column, value) pairs at the given line
pub fn row(line: u64, fields: &[(&str, &str)]) -> RawRow {
    RawRow::new(
        line,
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

/// A row that passes every rule
pub fn valid_row(line: u64) -> RawRow {
    row(
        line,
        &[
            ("identifier", CLICK_ID),
            ("timestamp", "2025-01-01T10:00:00+00:00"),
            ("value", "50"),
            ("currency", "usd"),
            ("conversion_action_id", "987654321"),
        ],
    )
}
