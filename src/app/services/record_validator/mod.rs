//! Record validation for conversion rows
//!
//! This module promotes a [`RawRow`](crate::app::models::RawRow) to a typed
//! [`ConversionRecord`](crate::app::models::ConversionRecord) or terminates it
//! with a [`ValidationError`](crate::app::models::ValidationError). Validation
//! never fails the run: a bad row is a value, not an error.
//!
//! - [`validator`] - Rule ordering and record construction
//! - [`field_parsers`] - Timestamp, amount, currency and id parsers

pub mod field_parsers;
pub mod validator;

#[cfg(test)]
pub mod tests;

pub use validator::{RecordValidator, ValidationRules, validate_row};
