//! Per-row outcome accumulation
//!
//! The reporter is the single writer of run outcomes. Outcomes are keyed by
//! source row, so batches may be recorded in any completion order and the
//! summary still lists failures in input order.

use std::collections::BTreeMap;
use tracing::debug;

use crate::app::models::{BatchResult, EventOutcome, FailureEntry, UploadSummary, ValidationError};
use crate::{Error, Result};

/// Final state of one input row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Succeeded,
    /// Rejected by the remote, or lost to a transport failure
    Failed(String),
    /// Never reached upload
    Skipped(String),
}

/// Accumulates outcomes over a full run
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    outcomes: BTreeMap<u64, RowOutcome>,
    transport_failures: usize,
    dry_run: bool,
    cancelled: bool,
}

impl Reporter {
    /// Create an empty reporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag the summary as coming from a dry run
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Number of rows with a recorded outcome
    pub fn rows_recorded(&self) -> usize {
        self.outcomes.len()
    }

    /// Record a row that failed validation
    pub fn record_validation_error(&mut self, error: &ValidationError) -> Result<()> {
        self.insert(
            error.row,
            RowOutcome::Skipped(format!("{} {}", error.reason, error.field)),
        )
    }

    /// Record a completed batch; `rows[i]` is the source row of event `i`
    pub fn record_batch(&mut self, rows: &[u64], result: &BatchResult) -> Result<()> {
        if rows.len() != result.submitted_count
            || result.per_event_outcome.len() != result.submitted_count
        {
            return Err(Error::summary_invariant(format!(
                "batch of {} rows returned {} outcomes for {} submitted events",
                rows.len(),
                result.per_event_outcome.len(),
                result.submitted_count
            )));
        }

        for (index, outcome) in &result.per_event_outcome {
            let row = *rows.get(*index).ok_or_else(|| {
                Error::summary_invariant(format!("outcome index {} outside batch", index))
            })?;
            let row_outcome = match outcome {
                EventOutcome::Success => RowOutcome::Succeeded,
                EventOutcome::Failure { code, message } => {
                    RowOutcome::Failed(format!("{}: {}", code, message))
                }
            };
            self.insert(row, row_outcome)?;
        }

        debug!(
            "Recorded batch of {}: {} succeeded",
            rows.len(),
            result.success_count()
        );
        Ok(())
    }

    /// Record a batch whose upload call failed as a whole
    pub fn record_transport_failure(&mut self, rows: &[u64], error: &Error) -> Result<()> {
        self.transport_failures += 1;
        let reason = error.to_string();
        for row in rows {
            self.insert(*row, RowOutcome::Failed(reason.clone()))?;
        }
        Ok(())
    }

    /// Record validated rows that were never submitted
    pub fn record_not_submitted(&mut self, rows: &[u64], reason: &str) -> Result<()> {
        for row in rows {
            self.insert(*row, RowOutcome::Failed(format!("not submitted: {}", reason)))?;
        }
        Ok(())
    }

    /// Note that the run stopped early
    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    fn insert(&mut self, row: u64, outcome: RowOutcome) -> Result<()> {
        if self.outcomes.contains_key(&row) {
            return Err(Error::summary_invariant(format!(
                "row {} recorded twice",
                row
            )));
        }
        self.outcomes.insert(row, outcome);
        Ok(())
    }

    /// Build the summary for a run that read `total` data rows
    pub fn finish(self, total: usize) -> Result<UploadSummary> {
        let mut succeeded = 0;
        let mut failed = 0;
        let mut skipped_validation = 0;
        let mut failures = Vec::new();

        for (row, outcome) in self.outcomes {
            match outcome {
                RowOutcome::Succeeded => succeeded += 1,
                RowOutcome::Failed(reason) => {
                    failed += 1;
                    failures.push(FailureEntry { row, reason });
                }
                RowOutcome::Skipped(reason) => {
                    skipped_validation += 1;
                    failures.push(FailureEntry { row, reason });
                }
            }
        }

        if succeeded + failed + skipped_validation != total {
            return Err(Error::summary_invariant(format!(
                "total {} != succeeded {} + failed {} + skipped {}",
                total, succeeded, failed, skipped_validation
            )));
        }

        Ok(UploadSummary {
            total,
            succeeded,
            failed,
            skipped_validation,
            failures,
            transport_failures: self.transport_failures,
            dry_run: self.dry_run,
            cancelled: self.cancelled,
        })
    }
}
