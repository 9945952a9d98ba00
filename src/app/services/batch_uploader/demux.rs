//! Partial-failure demultiplexing
//!
//! Maps a remote response back onto the submitted events by the index the
//! remote reports. When the response cannot be tied to indices with
//! certainty, every event in the batch is marked ambiguous instead of
//! attributing a failure to the wrong row.

use std::collections::BTreeMap;
use tracing::warn;

use super::client::{ItemError, UploadResponse};
use crate::app::models::EventOutcome;
use crate::constants::AMBIGUOUS_CODE;

/// One outcome per submitted event, in submission order
pub fn demultiplex(submitted: usize, response: &UploadResponse) -> Vec<(usize, EventOutcome)> {
    if let Some(reason) = ambiguity(submitted, response) {
        warn!("Marking batch of {} events ambiguous: {}", submitted, reason);
        return (0..submitted)
            .map(|index| (index, EventOutcome::failure(AMBIGUOUS_CODE, reason.clone())))
            .collect();
    }

    let mut errors_by_index: BTreeMap<usize, Vec<&ItemError>> = BTreeMap::new();
    for error in response.per_item_errors.iter().flatten() {
        if let Some(index) = error.index {
            errors_by_index.entry(index).or_default().push(error);
        }
    }

    (0..submitted)
        .map(|index| match errors_by_index.get(&index) {
            None => (index, EventOutcome::Success),
            Some(errors) => (index, merge_errors(errors)),
        })
        .collect()
}

/// Why the response cannot be attributed per index, if it cannot
fn ambiguity(submitted: usize, response: &UploadResponse) -> Option<String> {
    if response.results.len() != submitted {
        return Some(format!(
            "remote reported {} results for {} submitted events",
            response.results.len(),
            submitted
        ));
    }

    for error in response.per_item_errors.iter().flatten() {
        match error.index {
            None => {
                return Some(format!(
                    "unindexed error {}: {}",
                    error.code, error.message
                ));
            }
            Some(index) if index >= submitted => {
                return Some(format!(
                    "error index {} outside batch of {}",
                    index, submitted
                ));
            }
            Some(_) => {}
        }
    }

    None
}

fn merge_errors(errors: &[&ItemError]) -> EventOutcome {
    let code = errors
        .iter()
        .map(|e| e.code.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    EventOutcome::Failure { code, message }
}
