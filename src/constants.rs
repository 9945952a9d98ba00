//! Application constants for the conversion uploader
//!
//! This module contains column names, provider limits, environment variable
//! names and default values used throughout the application.

// =============================================================================
// Input File Columns
// =============================================================================

/// Canonical column names recognised in the input file
pub mod columns {
    /// Click identifier (gclid or equivalent)
    pub const IDENTIFIER: &str = "identifier";

    /// Conversion date-time with offset
    pub const TIMESTAMP: &str = "timestamp";

    /// Optional conversion value
    pub const VALUE: &str = "value";

    /// Optional ISO 4217 currency code
    pub const CURRENCY: &str = "currency";

    /// Optional per-row conversion action override
    pub const CONVERSION_ACTION_ID: &str = "conversion_action_id";

    /// Columns that must appear in the header
    pub const REQUIRED: &[&str] = &[IDENTIFIER, TIMESTAMP];

    /// Header aliases used by CRM exports and older upload templates
    pub const ALIASES: &[(&str, &str)] = &[
        ("gclid", IDENTIFIER),
        ("conversion_date_time", TIMESTAMP),
        ("conversion_value", VALUE),
        ("currency_code", CURRENCY),
    ];
}

/// Default input file when none is given on the command line
pub const DEFAULT_INPUT_PATH: &str = "data/sample-conversion-upload.csv";

/// Default field delimiter
pub const DEFAULT_DELIMITER: char = ',';

// =============================================================================
// Provider Limits and Endpoints
// =============================================================================

/// Maximum number of conversions the provider accepts in one upload call
pub const MAX_BATCH_SIZE: usize = 2000;

/// Batches in flight at once unless configured otherwise
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Upper bound on concurrently submitted batches
pub const MAX_CONCURRENT_BATCHES: usize = 16;

/// Default request timeout for the upload call
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default currency used when neither the row nor the operator supplies one
pub const DEFAULT_CURRENCY: &str = "USD";

/// Google Ads REST endpoint
pub const DEFAULT_API_ENDPOINT: &str = "https://googleads.googleapis.com";

/// Google Ads REST API version used for uploads
pub const API_VERSION: &str = "v17";

/// OAuth2 token endpoint used to exchange the refresh token
pub const OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Field name the provider uses in partial-failure locations
pub const CONVERSIONS_FIELD: &str = "conversions";

/// Outcome code used when per-item errors cannot be tied to an index
pub const AMBIGUOUS_CODE: &str = "AMBIGUOUS";

// =============================================================================
// Click Identifier Shape
// =============================================================================

/// Click identifier shape checks
pub mod click_id {
    /// Shortest identifier that looks like a real click id
    pub const MIN_LEN: usize = 20;

    /// Longest identifier accepted by the provider
    pub const MAX_LEN: usize = 200;

    /// Allowed characters
    pub const PATTERN: &str = r"^[A-Za-z0-9_-]+$";
}

// =============================================================================
// Environment Variables
// =============================================================================

/// Environment variable names for static configuration and credentials
pub mod env {
    pub const CUSTOMER_ID: &str = "GOOGLE_ADS_CUSTOMER_ID";
    pub const LOGIN_CUSTOMER_ID: &str = "GOOGLE_ADS_LOGIN_CUSTOMER_ID";
    pub const CONVERSION_ACTION_ID: &str = "CONVERSION_ACTION_ID";
    pub const DEFAULT_CURRENCY: &str = "DEFAULT_CURRENCY_CODE";
    pub const CLIENT_ID: &str = "GOOGLE_ADS_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "GOOGLE_ADS_CLIENT_SECRET";
    pub const DEVELOPER_TOKEN: &str = "GOOGLE_ADS_DEVELOPER_TOKEN";
    pub const REFRESH_TOKEN: &str = "GOOGLE_ADS_REFRESH_TOKEN";
    pub const API_ENDPOINT: &str = "GOOGLE_ADS_API_ENDPOINT";
    pub const OAUTH_TOKEN_URL: &str = "GOOGLE_ADS_OAUTH_TOKEN_URL";
}
