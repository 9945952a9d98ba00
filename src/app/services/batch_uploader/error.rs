//! Transport error types

use std::time::Duration;
use thiserror::Error;

/// Failure of an upload call as a whole
///
/// Per-event rejections inside a successful call are not transport errors;
/// they come back as failures in the batch result.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Request rejected {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Map an HTTP status and body onto the matching variant
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => TransportError::Auth { status, message },
            500..=599 => TransportError::Server { status, message },
            _ => TransportError::Rejected { status, message },
        }
    }

    /// HTTP status, when the remote answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Auth { status, .. }
            | TransportError::Server { status, .. }
            | TransportError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
