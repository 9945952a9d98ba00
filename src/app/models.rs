//! Core data models for conversion uploads
//!
//! This module contains the types that flow through the upload pipeline,
//! from raw CSV rows to the final per-row summary.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One data row from the input file, keyed by canonical column name
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the input file (the header is line 1)
    pub line: u64,
    fields: Vec<(String, String)>,
}

impl RawRow {
    /// Create a row from ordered (column, value) pairs
    pub fn new(line: u64, fields: Vec<(String, String)>) -> Self {
        Self { line, fields }
    }

    /// Get the raw value for a column, if the column exists
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Get a trimmed value, treating blank cells as absent
    pub fn get_non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Iterate over (column, value) pairs in header order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A validated conversion row
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRecord {
    /// Source line in the input file
    pub row: u64,
    /// Opaque click identifier
    pub identifier: String,
    /// Conversion time, keeping the offset given in the file
    pub timestamp: DateTime<FixedOffset>,
    /// Conversion value; absent means a no-revenue conversion
    pub value: Option<Decimal>,
    /// Upper-case ISO 4217 code
    pub currency: Option<String>,
    /// Per-row conversion action override
    pub conversion_action_id: Option<String>,
}

/// Why a row failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationReason {
    /// Required field absent or blank
    Missing,
    /// Field present but unusable
    Malformed,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::Missing => write!(f, "MISSING"),
            ValidationReason::Malformed => write!(f, "MALFORMED"),
        }
    }
}

/// A row rejected before upload
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("row {row}: {reason} {field}")]
pub struct ValidationError {
    pub row: u64,
    pub field: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn missing(row: u64, field: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            reason: ValidationReason::Missing,
        }
    }

    pub fn malformed(row: u64, field: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            reason: ValidationReason::Malformed,
        }
    }
}

/// Provider-shaped click conversion
///
/// Serialises to the field names of the `uploadClickConversions` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionEvent {
    /// Source line; not part of the payload
    #[serde(skip)]
    pub row: u64,
    pub gclid: String,
    /// `customers/{customerId}/conversionActions/{actionId}`
    pub conversion_action: String,
    /// `yyyy-mm-dd hh:mm:ss+hh:mm`
    pub conversion_date_time: String,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub conversion_value: Option<Decimal>,
    pub currency_code: String,
}

/// Result of one event within a submitted batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventOutcome {
    Success,
    Failure { code: String, message: String },
}

impl EventOutcome {
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EventOutcome::Success)
    }
}

/// Outcome of one upload call, in submission order
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub submitted_count: usize,
    /// (index within the batch, outcome); one entry per submitted event
    pub per_event_outcome: Vec<(usize, EventOutcome)>,
}

impl BatchResult {
    /// Number of events the remote accepted
    pub fn success_count(&self) -> usize {
        self.per_event_outcome
            .iter()
            .filter(|(_, outcome)| outcome.is_success())
            .count()
    }

    /// Number of events the remote rejected
    pub fn failure_count(&self) -> usize {
        self.submitted_count - self.success_count()
    }
}

/// A row that did not end in a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEntry {
    pub row: u64,
    pub reason: String,
}

/// Final per-run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped_validation: usize,
    /// Failed and skipped rows, in input order
    pub failures: Vec<FailureEntry>,
    /// Batches whose upload call failed as a whole
    pub transport_failures: usize,
    pub dry_run: bool,
    pub cancelled: bool,
}

impl UploadSummary {
    /// Every row was uploaded successfully
    pub fn is_full_success(&self) -> bool {
        self.failed == 0 && self.skipped_validation == 0 && !self.cancelled
    }

    /// Percentage of rows that were uploaded
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }
}
