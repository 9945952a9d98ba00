//! Streaming reader over conversion upload files
//!
//! Rows are pulled from the underlying reader one at a time, so arbitrarily
//! large exports are never held in memory. The reader is forward-only; open
//! the file again to start over.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::column_mapping::ColumnMapping;
use crate::app::models::RawRow;
use crate::constants::DEFAULT_DELIMITER;
use crate::{Error, Result};

/// Lazy iterator of [`RawRow`]s in file order
///
/// Yields `Err` at most once: after an I/O or format error the iterator is
/// exhausted.
#[derive(Debug)]
pub struct RecordReader<R: Read> {
    source: String,
    reader: csv::Reader<R>,
    mapping: ColumnMapping,
    record: csv::StringRecord,
    finished: bool,
}

impl RecordReader<File> {
    /// Open a file with the default delimiter
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_delimiter(path, DEFAULT_DELIMITER as u8)
    }

    /// Open a file with a custom single-byte delimiter
    pub fn open_with_delimiter(path: &Path, delimiter: u8) -> Result<Self> {
        info!("Opening conversion file: {}", path.display());

        let file = File::open(path).map_err(|e| {
            Error::io(
                format!("Failed to open input file {}", path.display()),
                e,
            )
        })?;

        Self::from_reader(file, path.display().to_string(), delimiter)
    }
}

impl<R: Read> RecordReader<R> {
    /// Wrap any reader; `source` labels errors and log lines
    pub fn from_reader(reader: R, source: impl Into<String>, delimiter: u8) -> Result<Self> {
        let source = source.into();

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| convert_csv_error(&source, e))?
            .clone();

        let mapping = ColumnMapping::analyze(&headers, &source)?;
        debug!("Column mapping for {}: {:?}", source, mapping.names);

        Ok(Self {
            source,
            reader: csv_reader,
            mapping,
            record: csv::StringRecord::new(),
            finished: false,
        })
    }

    /// Canonical column layout of the file
    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// Label used for this input in errors
    pub fn source(&self) -> &str {
        &self.source
    }

    fn next_row(&mut self) -> Result<Option<RawRow>> {
        if !self
            .reader
            .read_record(&mut self.record)
            .map_err(|e| convert_csv_error(&self.source, e))?
        {
            return Ok(None);
        }

        let line = self
            .record
            .position()
            .map(|p| p.line())
            .unwrap_or_default();

        if self.record.len() != self.mapping.len() {
            return Err(Error::format(
                self.source.clone(),
                line,
                format!(
                    "Expected {} columns but found {}",
                    self.mapping.len(),
                    self.record.len()
                ),
            ));
        }

        let fields = self
            .mapping
            .names
            .iter()
            .zip(self.record.iter())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();

        Ok(Some(RawRow::new(line, fields)))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Map a csv error onto the crate taxonomy, keeping the line when known
fn convert_csv_error(source: &str, error: csv::Error) -> Error {
    let message = error.to_string();
    let line = error.position().map(|p| p.line());

    match (error.into_kind(), line) {
        (csv::ErrorKind::Io(io_error), _) => {
            Error::io(format!("Failed to read {}", source), io_error)
        }
        (_, Some(line)) => Error::format(source, line, message),
        (_, None) => Error::csv_parsing(source, message, None),
    }
}
