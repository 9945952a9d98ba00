//! Header analysis for conversion upload files
//!
//! This module turns the header row into canonical column names, folding
//! the aliases used by CRM exports onto the names the validator expects.

use crate::constants::columns;
use crate::{Error, Result};
use csv::StringRecord;
use std::collections::HashMap;

/// Canonical column layout of an input file
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    /// Canonical names in header order
    pub names: Vec<String>,

    /// Column name to index mapping
    pub name_to_index: HashMap<String, usize>,
}

impl ColumnMapping {
    /// Analyze the header row of `source`
    ///
    /// Fails with a format error at line 1 when the header is empty, names
    /// the same column twice (after alias folding) or lacks a required column.
    pub fn analyze(headers: &StringRecord, source: &str) -> Result<Self> {
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(Error::format(source, 1, "Missing header row"));
        }

        let mut names = Vec::with_capacity(headers.len());
        let mut name_to_index = HashMap::new();

        for (index, header) in headers.iter().enumerate() {
            let column_name = canonical_name(header);
            if !column_name.is_empty() && name_to_index.contains_key(&column_name) {
                return Err(Error::format(
                    source,
                    1,
                    format!("Duplicate column '{}' (header '{}')", column_name, header),
                ));
            }
            name_to_index.insert(column_name.clone(), index);
            names.push(column_name);
        }

        for required in columns::REQUIRED {
            if !name_to_index.contains_key(*required) {
                return Err(Error::format(
                    source,
                    1,
                    format!("Required column '{}' not found in header", required),
                ));
            }
        }

        Ok(ColumnMapping {
            names,
            name_to_index,
        })
    }

    /// Number of columns every data row must have
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get the index for a given column name
    pub fn get_index(&self, column_name: &str) -> Option<usize> {
        self.name_to_index.get(column_name).copied()
    }

    /// Check if a column exists in the mapping
    pub fn has_column(&self, column_name: &str) -> bool {
        self.name_to_index.contains_key(column_name)
    }
}

/// Normalise a header cell: strip BOM and whitespace, lower-case, resolve aliases
pub fn canonical_name(header: &str) -> String {
    let name = header.trim_start_matches('\u{feff}').trim().to_ascii_lowercase();
    columns::ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(name)
}
