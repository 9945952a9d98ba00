//! Batch uploader for conversion events
//!
//! This module submits mapped events to the advertising API, one call per
//! batch, and turns the partial-failure response into a
//! [`BatchResult`](crate::app::models::BatchResult) with exactly one outcome
//! per submitted event.
//!
//! ## Architecture
//!
//! - [`uploader`] - Batch size checks and the single remote call
//! - [`client`] - Transport-independent client trait and response shape
//! - [`demux`] - Index-keyed attribution of per-item errors
//! - [`http`] - Google Ads REST implementation of the client trait
//! - [`error`] - Whole-call transport failures
//!
//! There is no retry: a failed call is reported once and the caller decides
//! what to do with it.

pub mod client;
pub mod demux;
pub mod error;
pub mod http;
pub mod uploader;

#[cfg(test)]
pub mod tests;

use std::sync::Arc;
use tracing::debug;

pub use client::{ConversionUploadClient, DryRunClient, ItemError, UploadResponse, UploadedConversion};
pub use error::TransportError;
pub use http::GoogleAdsClient;
pub use uploader::BatchUploader;

use crate::config::{ApiCredentials, StaticConfig, UploadConfig};
use crate::{Error, Result};

/// Create the upload client for a run
///
/// Dry runs never need credentials; real runs require all of them.
pub fn create_client(
    config: &StaticConfig,
    credentials: ApiCredentials,
    upload: &UploadConfig,
) -> Result<Arc<dyn ConversionUploadClient>> {
    if upload.dry_run {
        debug!("create_client: dry run, using accept-all client");
        return Ok(Arc::new(DryRunClient));
    }

    credentials.validate()?;
    let client = GoogleAdsClient::new(config, credentials, upload).map_err(Error::Transport)?;
    Ok(Arc::new(client))
}
