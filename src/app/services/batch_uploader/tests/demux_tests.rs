//! Tests for partial-failure attribution

use super::*;
use crate::app::models::EventOutcome;
use crate::app::services::batch_uploader::demux::demultiplex;
use crate::constants::AMBIGUOUS_CODE;

#[test]
fn test_no_errors_means_all_success() {
    let outcomes = demultiplex(3, &UploadResponse::all_accepted(3));
    assert_eq!(
        outcomes,
        vec![
            (0, EventOutcome::Success),
            (1, EventOutcome::Success),
            (2, EventOutcome::Success),
        ]
    );
}

#[test]
fn test_indexed_error_hits_only_its_event() {
    let mut response = UploadResponse::all_accepted(3);
    response.per_item_errors = Some(vec![indexed_error(1, "EXPIRED_EVENT")]);

    let outcomes = demultiplex(3, &response);
    assert_eq!(outcomes[0], (0, EventOutcome::Success));
    assert_eq!(
        outcomes[1],
        (1, EventOutcome::failure("EXPIRED_EVENT", "EXPIRED_EVENT at 1"))
    );
    assert_eq!(outcomes[2], (2, EventOutcome::Success));
}

#[test]
fn test_errors_on_same_index_are_merged() {
    let mut response = UploadResponse::all_accepted(2);
    response.per_item_errors = Some(vec![indexed_error(0, "A"), indexed_error(0, "B")]);

    let outcomes = demultiplex(2, &response);
    assert_eq!(
        outcomes[0],
        (0, EventOutcome::failure("A; B", "A at 0; B at 0"))
    );
    assert!(outcomes[1].1.is_success());
}

#[test]
fn test_unindexed_error_makes_whole_batch_ambiguous() {
    let mut response = UploadResponse::all_accepted(3);
    response.per_item_errors = Some(vec![
        indexed_error(0, "A"),
        ItemError {
            index: None,
            code: "B".to_string(),
            message: "no location".to_string(),
        },
    ]);

    let outcomes = demultiplex(3, &response);
    assert_eq!(outcomes.len(), 3);
    for (i, (index, outcome)) in outcomes.iter().enumerate() {
        assert_eq!(*index, i);
        match outcome {
            EventOutcome::Failure { code, .. } => assert_eq!(code, AMBIGUOUS_CODE),
            other => panic!("expected ambiguous failure, got {:?}", other),
        }
    }
}

#[test]
fn test_out_of_range_index_is_ambiguous() {
    let mut response = UploadResponse::all_accepted(2);
    response.per_item_errors = Some(vec![indexed_error(5, "A")]);

    let outcomes = demultiplex(2, &response);
    assert!(outcomes.iter().all(|(_, o)| !o.is_success()));
}

#[test]
fn test_result_count_mismatch_is_ambiguous() {
    let outcomes = demultiplex(3, &UploadResponse::all_accepted(2));
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|(_, o)| !o.is_success()));
}
