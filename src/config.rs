//! Configuration management and validation.
//!
//! Provides the immutable configuration values threaded through the
//! pipeline: account-level defaults for the mapper, API credentials for
//! the transport, and batching limits for the uploader.

use crate::constants::{
    self, DEFAULT_API_ENDPOINT, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS, MAX_BATCH_SIZE,
    MAX_CONCURRENT_BATCHES, OAUTH_TOKEN_URL,
};
use crate::{Error, Result};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Account-level values the mapper needs to build provider payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticConfig {
    /// Advertising account id, digits only
    pub customer_id: String,

    /// Conversion action used when a row does not name one
    pub default_conversion_action_id: String,

    /// ISO 4217 code used when a row has no currency
    pub default_currency: String,
}

impl StaticConfig {
    /// Build a config, normalising the customer id and currency code
    pub fn new(
        customer_id: impl AsRef<str>,
        default_conversion_action_id: impl Into<String>,
        default_currency: impl AsRef<str>,
    ) -> Result<Self> {
        let config = Self {
            customer_id: normalize_customer_id(customer_id.as_ref()),
            default_conversion_action_id: default_conversion_action_id.into().trim().to_string(),
            default_currency: default_currency.as_ref().trim().to_ascii_uppercase(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.customer_id.is_empty() || !self.customer_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::configuration(format!(
                "Customer id must be numeric (hyphens allowed), got '{}'",
                self.customer_id
            )));
        }

        if self.default_conversion_action_id.is_empty()
            || !self
                .default_conversion_action_id
                .chars()
                .all(|c| c.is_ascii_digit())
        {
            return Err(Error::configuration(format!(
                "Default conversion action id must be numeric, got '{}'",
                self.default_conversion_action_id
            )));
        }

        if self.default_currency.len() != 3
            || !self.default_currency.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(Error::configuration(format!(
                "Default currency must be a 3-letter code, got '{}'",
                self.default_currency
            )));
        }

        Ok(())
    }
}

/// Strip the hyphens operators copy from the account UI (`123-456-7890`)
pub fn normalize_customer_id(raw: &str) -> String {
    raw.trim().chars().filter(|c| *c != '-').collect()
}

/// OAuth2 and developer credentials for the upload API
#[derive(Clone, Default)]
pub struct ApiCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub developer_token: String,
    pub refresh_token: String,
    /// Manager account id when uploading through an MCC
    pub login_customer_id: Option<String>,
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("developer_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("login_customer_id", &self.login_customer_id)
            .finish()
    }
}

impl ApiCredentials {
    /// Names of the environment variables whose values are missing
    pub fn missing_variables(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (value, name) in [
            (&self.client_id, constants::env::CLIENT_ID),
            (&self.client_secret, constants::env::CLIENT_SECRET),
            (&self.developer_token, constants::env::DEVELOPER_TOKEN),
            (&self.refresh_token, constants::env::REFRESH_TOKEN),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        missing
    }

    /// Validate that every credential is present
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_variables();
        if !missing.is_empty() {
            return Err(Error::configuration(format!(
                "Missing required credentials: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

/// Batching and transport settings
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Events per upload call
    pub max_batch_size: usize,

    /// Batches allowed in flight at once
    pub concurrent_batches: usize,

    /// Per-request timeout enforced by the HTTP client
    pub timeout: Duration,

    /// Base URL of the upload API
    pub api_endpoint: String,

    /// OAuth2 endpoint that exchanges the refresh token
    pub oauth_token_url: String,

    /// Validate and map only; never call the remote API
    pub dry_run: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_batch_size: MAX_BATCH_SIZE,
            concurrent_batches: DEFAULT_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            oauth_token_url: OAUTH_TOKEN_URL.to_string(),
            dry_run: false,
        }
    }
}

impl UploadConfig {
    /// Set the batch size
    pub fn with_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Set the number of concurrent batches
    pub fn with_concurrency(mut self, concurrent_batches: usize) -> Self {
        self.concurrent_batches = concurrent_batches;
        self
    }

    /// Point the client at other API and token endpoints
    pub fn with_endpoints(
        mut self,
        api_endpoint: impl Into<String>,
        oauth_token_url: impl Into<String>,
    ) -> Self {
        self.api_endpoint = api_endpoint.into();
        self.oauth_token_url = oauth_token_url.into();
        self
    }

    /// Enable dry-run mode
    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.max_batch_size == 0 || self.max_batch_size > MAX_BATCH_SIZE {
            return Err(Error::configuration(format!(
                "Batch size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.max_batch_size
            )));
        }

        if self.concurrent_batches == 0 || self.concurrent_batches > MAX_CONCURRENT_BATCHES {
            return Err(Error::configuration(format!(
                "Concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENT_BATCHES, self.concurrent_batches
            )));
        }

        if self.timeout.is_zero() {
            return Err(Error::configuration("Timeout must be greater than 0"));
        }

        debug!("Upload configuration validated: {:?}", self);
        Ok(())
    }
}
