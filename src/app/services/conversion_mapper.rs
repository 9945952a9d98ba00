//! Projection of validated records onto provider click conversions
//!
//! Mapping is pure and cannot fail: every check that could reject a row
//! has already run in the validator.

use crate::app::models::{ConversionEvent, ConversionRecord};
use crate::config::StaticConfig;

/// Provider format for conversion date-times
const CONVERSION_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Resource name of a conversion action
pub fn conversion_action_path(customer_id: &str, conversion_action_id: &str) -> String {
    format!(
        "customers/{}/conversionActions/{}",
        customer_id, conversion_action_id
    )
}

/// Build the provider payload for one record
pub fn map_record(record: &ConversionRecord, config: &StaticConfig) -> ConversionEvent {
    let action_id = record
        .conversion_action_id
        .as_deref()
        .unwrap_or(&config.default_conversion_action_id);

    let currency_code = record
        .currency
        .clone()
        .unwrap_or_else(|| config.default_currency.clone());

    ConversionEvent {
        row: record.row,
        gclid: record.identifier.clone(),
        conversion_action: conversion_action_path(&config.customer_id, action_id),
        conversion_date_time: record
            .timestamp
            .format(CONVERSION_DATE_TIME_FORMAT)
            .to_string(),
        conversion_value: record.value,
        currency_code,
    }
}
