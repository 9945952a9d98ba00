//! Conversion Uploader Library
//!
//! A Rust library for uploading offline click conversions (phone calls, leads,
//! closed deals) from a CSV export to an advertising API in batches.
//!
//! This library provides tools for:
//! - Streaming conversion rows out of delimited files with header validation
//! - Validating and normalising each row into a typed conversion record
//! - Mapping records onto the provider's click-conversion payload
//! - Submitting batches with partial-failure tolerance and demultiplexing
//!   per-item errors back onto the originating rows
//! - Reporting a per-row summary that accounts for every input row exactly once

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod batch_uploader;
        pub mod conversion_mapper;
        pub mod pipeline;
        pub mod record_parser;
        pub mod record_validator;
        pub mod reporter;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{
    BatchResult, ConversionEvent, ConversionRecord, EventOutcome, RawRow, UploadSummary,
    ValidationError, ValidationReason,
};
pub use app::services::batch_uploader::TransportError;
pub use config::{ApiCredentials, StaticConfig, UploadConfig};

/// Result type alias for the conversion uploader
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for conversion upload operations
///
/// Row-level problems are not errors at this level: they are carried as
/// [`ValidationError`] values or per-event failures inside a [`BatchResult`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed (input file unreadable)
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Structural problem with the input file
    #[error("Format error in '{file}' at line {line}: {message}")]
    Format {
        file: String,
        line: u64,
        message: String,
    },

    /// CSV reader error that is not a column-count mismatch
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Batch exceeds the configured maximum and was not submitted
    #[error("Batch of {size} events exceeds the maximum batch size of {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Attempted to submit a batch with no events
    #[error("Refusing to submit an empty batch")]
    EmptyBatch,

    /// Remote call failed as a whole
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Summary could not be serialised
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Summary counts do not add up
    #[error("Summary invariant violated: {message}")]
    SummaryInvariant { message: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a format error pointing at a line of the input
    pub fn format(file: impl Into<String>, line: u64, message: impl Into<String>) -> Self {
        Self::Format {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a batch too large error
    pub fn batch_too_large(size: usize, max: usize) -> Self {
        Self::BatchTooLarge { size, max }
    }

    /// Create a summary invariant error
    pub fn summary_invariant(message: impl Into<String>) -> Self {
        Self::SummaryInvariant {
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// Whether this error means the input file itself could not be used
    pub fn is_file_level(&self) -> bool {
        matches!(
            self,
            Error::Io { .. } | Error::Format { .. } | Error::CsvParsing { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}
