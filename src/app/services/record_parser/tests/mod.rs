//! Test utilities for the record parser

use std::io::Write;
use tempfile::NamedTempFile;


/// Header plus three rows in the canonical layout
pub fn create_sample_csv() -> String {
    "identifier,timestamp,value,currency,conversion_action_id\n\
     CjwKCAiA1KL3BRA8EiwAzCfbQxyz123abc,2025-12-19 10:30:00-08:00,0,USD,987654321\n\
     EAIaIQobChMIxyz987654321abcdef,2025-12-19T14:00:00+00:00,4500,,\n\
     CjwKCAiA1KL3BRA8EiwAzCfbQother456,2025-12-20T09:15:00Z,,EUR,\n"
        .to_string()
}

/// Helper to create a temporary file with given content
pub fn create_temp_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{}", content).unwrap();
    temp_file
}
