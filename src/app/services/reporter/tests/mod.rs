//! Test utilities for the reporter

use crate::app::models::{BatchResult, EventOutcome};


/// Batch result where the given batch indices were rejected
pub fn batch_result(size: usize, rejected: &[usize]) -> BatchResult {
    BatchResult {
        submitted_count: size,
        per_event_outcome: (0..size)
            .map(|i| {
                if rejected.contains(&i) {
                    (i, EventOutcome::failure("conversionUploadError:EXPIRED_EVENT", "too old"))
                } else {
                    (i, EventOutcome::Success)
                }
            })
            .collect(),
    }
}
