//! Batch submission with partial-failure tolerance

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::client::ConversionUploadClient;
use super::demux::demultiplex;
use crate::app::models::{BatchResult, ConversionEvent};
use crate::{Error, Result};

/// Submits batches of conversion events, one remote call per batch
#[derive(Clone)]
pub struct BatchUploader {
    client: Arc<dyn ConversionUploadClient>,
    max_batch_size: usize,
}

impl BatchUploader {
    /// Create an uploader over `client`
    pub fn new(client: Arc<dyn ConversionUploadClient>, max_batch_size: usize) -> Self {
        Self {
            client,
            max_batch_size,
        }
    }

    /// Largest batch this uploader will submit
    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Submit `events` in a single call
    ///
    /// Empty and oversized batches are rejected before any network traffic.
    /// A transport failure fails the whole call; per-event rejections are
    /// returned inside the [`BatchResult`].
    pub async fn upload(&self, events: &[ConversionEvent]) -> Result<BatchResult> {
        if events.is_empty() {
            return Err(Error::EmptyBatch);
        }
        if events.len() > self.max_batch_size {
            return Err(Error::batch_too_large(events.len(), self.max_batch_size));
        }

        let first_row = events.first().map(|e| e.row).unwrap_or_default();
        let last_row = events.last().map(|e| e.row).unwrap_or_default();
        info!(
            "Uploading batch of {} events (rows {}-{}) via {}",
            events.len(),
            first_row,
            last_row,
            self.client.name()
        );

        let response = self.client.upload_batch(events, true).await.map_err(|e| {
            warn!("Batch for rows {}-{} failed: {}", first_row, last_row, e);
            Error::Transport(e)
        })?;

        let per_event_outcome = demultiplex(events.len(), &response);
        let result = BatchResult {
            submitted_count: events.len(),
            per_event_outcome,
        };

        debug!(
            "Batch for rows {}-{}: {} accepted, {} rejected",
            first_row,
            last_row,
            result.success_count(),
            result.failure_count()
        );
        Ok(result)
    }
}
