//! Test utilities and mock clients for the batch uploader

use async_trait::async_trait;
use std::sync::Mutex;

use crate::app::models::ConversionEvent;
use crate::app::services::batch_uploader::{
    ConversionUploadClient, ItemError, TransportError, UploadResponse,
};

mod demux_tests;

/// Build an event for the given source row
pub fn event(row: u64) -> ConversionEvent {
    ConversionEvent {
        row,
        gclid: format!("gclid-{}", row),
        conversion_action: "customers/1234567890/conversionActions/987654321".to_string(),
        conversion_date_time: "2025-01-01 10:00:00+00:00".to_string(),
        conversion_value: None,
        currency_code: "USD".to_string(),
    }
}

pub fn indexed_error(index: usize, code: &str) -> ItemError {
    ItemError {
        index: Some(index),
        code: code.to_string(),
        message: format!("{} at {}", code, index),
    }
}

/// Mock client that rejects fixed batch indices and records call sizes
#[derive(Default)]
pub struct MockClient {
    pub failing_indices: Vec<usize>,
    pub calls: Mutex<Vec<usize>>,
    pub partial_failure_flags: Mutex<Vec<bool>>,
}

impl MockClient {
    pub fn rejecting(indices: &[usize]) -> Self {
        Self {
            failing_indices: indices.to_vec(),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ConversionUploadClient for MockClient {
    async fn upload_batch(
        &self,
        events: &[ConversionEvent],
        partial_failure: bool,
    ) -> Result<UploadResponse, TransportError> {
        self.calls.lock().unwrap().push(events.len());
        self.partial_failure_flags
            .lock()
            .unwrap()
            .push(partial_failure);

        let mut response = UploadResponse::all_accepted(events.len());
        let errors: Vec<ItemError> = self
            .failing_indices
            .iter()
            .filter(|i| **i < events.len())
            .map(|i| indexed_error(*i, "conversionUploadError:UNPARSEABLE_GCLID"))
            .collect();
        if !errors.is_empty() {
            response.per_item_errors = Some(errors);
        }
        Ok(response)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Mock client that returns a fixed response or transport failure
pub struct FixedClient {
    pub outcome: Mutex<Option<Result<UploadResponse, TransportError>>>,
}

impl FixedClient {
    pub fn new(outcome: Result<UploadResponse, TransportError>) -> Self {
        Self {
            outcome: Mutex::new(Some(outcome)),
        }
    }
}

#[async_trait]
impl ConversionUploadClient for FixedClient {
    async fn upload_batch(
        &self,
        _events: &[ConversionEvent],
        _partial_failure: bool,
    ) -> Result<UploadResponse, TransportError> {
        self.outcome
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(TransportError::InvalidResponse("called twice".to_string())))
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
