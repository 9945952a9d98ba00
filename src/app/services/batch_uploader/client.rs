//! Upload client trait and response shape
//!
//! The uploader depends only on this contract, not on any transport.

use async_trait::async_trait;
use tracing::debug;

use super::TransportError;
use crate::app::models::ConversionEvent;

/// One slot of the remote `results` list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedConversion {
    /// Echoed click id; absent for slots the remote rejected
    pub gclid: Option<String>,
}

/// A per-item error from a partial-failure response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemError {
    /// Position of the offending event in the submitted batch, if reported
    pub index: Option<usize>,
    pub code: String,
    pub message: String,
}

/// Remote answer to one upload call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadResponse {
    pub results: Vec<UploadedConversion>,
    pub per_item_errors: Option<Vec<ItemError>>,
}

impl UploadResponse {
    /// Response accepting every one of `count` events
    pub fn all_accepted(count: usize) -> Self {
        Self {
            results: vec![UploadedConversion::default(); count],
            per_item_errors: None,
        }
    }
}

/// Remote upload API
#[async_trait]
pub trait ConversionUploadClient: Send + Sync {
    /// Submit all `events` in one call
    async fn upload_batch(
        &self,
        events: &[ConversionEvent],
        partial_failure: bool,
    ) -> Result<UploadResponse, TransportError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Client that accepts everything without touching the network
#[derive(Debug, Clone, Default)]
pub struct DryRunClient;

#[async_trait]
impl ConversionUploadClient for DryRunClient {
    async fn upload_batch(
        &self,
        events: &[ConversionEvent],
        _partial_failure: bool,
    ) -> Result<UploadResponse, TransportError> {
        debug!("Dry run: accepting {} events without upload", events.len());
        Ok(UploadResponse {
            results: events
                .iter()
                .map(|event| UploadedConversion {
                    gclid: Some(event.gclid.clone()),
                })
                .collect(),
            per_item_errors: None,
        })
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
