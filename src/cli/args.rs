//! Command-line argument definitions for the conversion uploader
//!
//! Every account and credential setting can come from a flag or from the
//! environment, so the tool runs unchanged from a shell or a scheduler.

use crate::config::{ApiCredentials, StaticConfig, UploadConfig};
use crate::constants::{
    DEFAULT_API_ENDPOINT, DEFAULT_CONCURRENCY, DEFAULT_CURRENCY, DEFAULT_DELIMITER,
    DEFAULT_INPUT_PATH, DEFAULT_TIMEOUT_SECS, MAX_BATCH_SIZE, OAUTH_TOKEN_URL, env,
};
use crate::{Error, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments for the conversion uploader
///
/// Reads offline click conversions from a delimited file, validates them,
/// and uploads them in batches with partial-failure reporting.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "conversion_uploader",
    version,
    about = "Upload offline click conversions from a CSV file in batches",
    long_about = "Reads offline conversions (calls, leads, closed deals) from a delimited file, \
                  validates every row, uploads valid rows in batches with partial failure \
                  enabled and prints a summary that accounts for every input row."
)]
pub struct Args {
    /// Input file with a header row
    #[arg(value_name = "INPUT", default_value = DEFAULT_INPUT_PATH)]
    pub input: PathBuf,

    /// Advertiser account that owns the conversions (hyphens allowed)
    #[arg(long = "customer-id", env = env::CUSTOMER_ID, value_name = "ID")]
    pub customer_id: Option<String>,

    /// Conversion action used when a row does not name one
    #[arg(
        long = "conversion-action-id",
        env = env::CONVERSION_ACTION_ID,
        value_name = "ID"
    )]
    pub conversion_action_id: Option<String>,

    /// Currency used when a row does not name one
    #[arg(
        long = "default-currency",
        env = env::DEFAULT_CURRENCY,
        default_value = DEFAULT_CURRENCY,
        value_name = "CODE"
    )]
    pub default_currency: String,

    /// Manager account to act through
    #[arg(long = "login-customer-id", env = env::LOGIN_CUSTOMER_ID, value_name = "ID")]
    pub login_customer_id: Option<String>,

    #[arg(long = "client-id", env = env::CLIENT_ID, hide_env_values = true)]
    pub client_id: Option<String>,

    #[arg(long = "client-secret", env = env::CLIENT_SECRET, hide_env_values = true)]
    pub client_secret: Option<String>,

    #[arg(long = "developer-token", env = env::DEVELOPER_TOKEN, hide_env_values = true)]
    pub developer_token: Option<String>,

    #[arg(long = "refresh-token", env = env::REFRESH_TOKEN, hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Base URL of the upload API
    #[arg(
        long = "api-endpoint",
        env = env::API_ENDPOINT,
        default_value = DEFAULT_API_ENDPOINT,
        value_name = "URL"
    )]
    pub api_endpoint: String,

    /// OAuth2 token endpoint used to refresh the access token
    #[arg(
        long = "oauth-token-url",
        env = env::OAUTH_TOKEN_URL,
        default_value = OAUTH_TOKEN_URL,
        value_name = "URL"
    )]
    pub oauth_token_url: String,

    /// Events per upload call
    #[arg(
        long = "batch-size",
        default_value_t = MAX_BATCH_SIZE,
        value_name = "N",
        help = "Events per upload call (1-2000)"
    )]
    pub batch_size: usize,

    /// Upload calls in flight at once
    #[arg(
        long = "concurrency",
        default_value_t = DEFAULT_CONCURRENCY,
        value_name = "N",
        help = "Upload calls in flight at once (1-16)"
    )]
    pub concurrency: usize,

    /// Request timeout for each upload call
    #[arg(
        long = "timeout-secs",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_name = "SECS"
    )]
    pub timeout_secs: u64,

    /// Field delimiter of the input file
    #[arg(long = "delimiter", default_value_t = DEFAULT_DELIMITER)]
    pub delimiter: char,

    /// Reject identifiers that do not look like click ids
    #[arg(long = "strict-identifiers")]
    pub strict_identifiers: bool,

    /// Validate and map every row without contacting the API
    ///
    /// Credentials are not required in this mode.
    #[arg(long = "dry-run", help = "Validate and map rows without uploading")]
    pub dry_run: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. The summary is still printed.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for the summary
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the summary"
    )]
    pub output_format: OutputFormat,
}

/// Summary output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Validate arguments that clap cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            return Err(Error::configuration(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::configuration(
                "Timeout must be greater than 0 seconds".to_string(),
            ));
        }
        Ok(())
    }

    /// Delimiter as the byte the CSV reader expects
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    /// Get log level string based on verbosity
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Account-level settings shared by every event
    pub fn static_config(&self) -> Result<StaticConfig> {
        let customer_id = self.customer_id.as_deref().ok_or_else(|| {
            Error::configuration(format!(
                "Customer id is required (--customer-id or {})",
                env::CUSTOMER_ID
            ))
        })?;
        let conversion_action_id = self.conversion_action_id.as_deref().ok_or_else(|| {
            Error::configuration(format!(
                "Conversion action id is required (--conversion-action-id or {})",
                env::CONVERSION_ACTION_ID
            ))
        })?;

        StaticConfig::new(customer_id, conversion_action_id, &self.default_currency)
    }

    /// API credentials; absent values stay empty so they can be reported together
    pub fn credentials(&self) -> ApiCredentials {
        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        ApiCredentials {
            client_id: value(&self.client_id),
            client_secret: value(&self.client_secret),
            developer_token: value(&self.developer_token),
            refresh_token: value(&self.refresh_token),
            login_customer_id: self
                .login_customer_id
                .as_deref()
                .map(crate::config::normalize_customer_id)
                .filter(|id| !id.is_empty()),
        }
    }

    /// Transport and batching settings
    pub fn upload_config(&self) -> Result<UploadConfig> {
        let mut config = UploadConfig::default()
            .with_batch_size(self.batch_size)
            .with_concurrency(self.concurrency);
        config.timeout = Duration::from_secs(self.timeout_secs);
        config = config.with_endpoints(&self.api_endpoint, &self.oauth_token_url);
        if self.dry_run {
            config = config.with_dry_run();
        }
        config.validate()?;
        Ok(config)
    }
}
