//! Row validation and normalisation
//!
//! Rules run in a fixed order and the first failure wins, so the same row
//! always reports the same field and reason.

use tracing::{debug, warn};

use super::field_parsers::{
    is_numeric_id, looks_like_click_id, parse_currency, parse_timestamp, parse_value,
};
use crate::app::models::{ConversionRecord, RawRow, ValidationError};
use crate::constants::columns;

/// Optional rules on top of the fixed validation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationRules {
    /// Reject identifiers that do not have the shape of a click id
    pub strict_identifiers: bool,
}

/// Turns raw rows into conversion records
#[derive(Debug, Clone, Default)]
pub struct RecordValidator {
    rules: ValidationRules,
}

impl RecordValidator {
    /// Create a validator with the given rules
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    /// Active rules
    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Validate one row
    ///
    /// Order: identifier, timestamp, value, currency, conversion action id.
    pub fn validate(&self, row: &RawRow) -> Result<ConversionRecord, ValidationError> {
        let line = row.line;

        let identifier = row
            .get_non_empty(columns::IDENTIFIER)
            .ok_or_else(|| ValidationError::missing(line, columns::IDENTIFIER))?;

        if !looks_like_click_id(identifier) {
            if self.rules.strict_identifiers {
                return Err(ValidationError::malformed(line, columns::IDENTIFIER));
            }
            warn!(
                "Row {}: identifier '{}' does not look like a click id",
                line, identifier
            );
        }

        let raw_timestamp = row
            .get_non_empty(columns::TIMESTAMP)
            .ok_or_else(|| ValidationError::missing(line, columns::TIMESTAMP))?;
        let timestamp = parse_timestamp(raw_timestamp)
            .ok_or_else(|| ValidationError::malformed(line, columns::TIMESTAMP))?;

        let value = row
            .get_non_empty(columns::VALUE)
            .map(|raw| parse_value(raw).ok_or_else(|| ValidationError::malformed(line, columns::VALUE)))
            .transpose()?;

        let currency = row
            .get_non_empty(columns::CURRENCY)
            .map(|raw| {
                parse_currency(raw).ok_or_else(|| ValidationError::malformed(line, columns::CURRENCY))
            })
            .transpose()?;

        let conversion_action_id = row
            .get_non_empty(columns::CONVERSION_ACTION_ID)
            .map(|raw| {
                if is_numeric_id(raw) {
                    Ok(raw.to_string())
                } else {
                    Err(ValidationError::malformed(
                        line,
                        columns::CONVERSION_ACTION_ID,
                    ))
                }
            })
            .transpose()?;

        debug!("Row {} validated", line);

        Ok(ConversionRecord {
            row: line,
            identifier: identifier.to_string(),
            timestamp,
            value,
            currency,
            conversion_action_id,
        })
    }
}

/// Validate a row with the default rules
pub fn validate_row(row: &RawRow) -> Result<ConversionRecord, ValidationError> {
    RecordValidator::default().validate(row)
}
