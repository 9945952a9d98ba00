//! Run reporting for conversion uploads
//!
//! This module accounts for every input row exactly once (succeeded, failed
//! remotely, or skipped by validation) and renders the resulting
//! [`UploadSummary`](crate::app::models::UploadSummary).
//!
//! - [`accumulator`] - Row-keyed outcome accumulation and invariant checks
//! - [`render`] - Human and JSON output

pub mod accumulator;
pub mod render;

#[cfg(test)]
pub mod tests;

pub use accumulator::{Reporter, RowOutcome};
pub use render::{render_human, render_json};
