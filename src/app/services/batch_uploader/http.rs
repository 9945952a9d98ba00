//! Google Ads REST transport
//!
//! Exchanges the refresh token for an access token, then posts each batch
//! to `customers/{id}:uploadClickConversions` with partial failure enabled.
//! Partial-failure details are flattened into indexed [`ItemError`]s.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::TransportError;
use super::client::{ConversionUploadClient, ItemError, UploadResponse, UploadedConversion};
use crate::app::models::ConversionEvent;
use crate::config::{ApiCredentials, StaticConfig, UploadConfig};
use crate::constants::{API_VERSION, CONVERSIONS_FIELD};

/// Refresh the access token this long before it expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Google Ads API client for click conversion uploads
pub struct GoogleAdsClient {
    http: Client,
    endpoint: String,
    token_url: String,
    customer_id: String,
    credentials: ApiCredentials,
    timeout: Duration,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl GoogleAdsClient {
    /// Create a client from configuration
    pub fn new(
        config: &StaticConfig,
        credentials: ApiCredentials,
        upload: &UploadConfig,
    ) -> Result<Self, TransportError> {
        debug!(customer_id = %config.customer_id, ?credentials, "GoogleAdsClient::new");
        let http = Client::builder()
            .timeout(upload.timeout)
            .build()
            .map_err(TransportError::Network)?;

        Ok(Self {
            http,
            endpoint: upload.api_endpoint.trim_end_matches('/').to_string(),
            token_url: upload.oauth_token_url.clone(),
            customer_id: config.customer_id.clone(),
            credentials,
            timeout: upload.timeout,
            token: Mutex::new(None),
        })
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/customers/{}:uploadClickConversions",
            self.endpoint, API_VERSION, self.customer_id
        )
    }

    /// Current access token, refreshing it when close to expiry
    async fn access_token(&self) -> Result<String, TransportError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && token.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN
        {
            return Ok(token.access_token.clone());
        }

        debug!("Refreshing OAuth access token");
        let response = self
            .http
            .post(self.token_url.as_str())
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| self.convert_request_error(e))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TransportError::Auth {
                status,
                message: format!("token refresh failed: {}", text),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(format!("token response: {}", e)))?;

        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(access_token)
    }

    fn convert_request_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Network(error)
        }
    }
}

#[async_trait]
impl ConversionUploadClient for GoogleAdsClient {
    async fn upload_batch(
        &self,
        events: &[ConversionEvent],
        partial_failure: bool,
    ) -> Result<UploadResponse, TransportError> {
        let access_token = self.access_token().await?;
        let body = serde_json::json!({
            "conversions": events,
            "partialFailure": partial_failure,
        });

        let mut request = self
            .http
            .post(self.upload_url())
            .bearer_auth(access_token)
            .header("developer-token", self.credentials.developer_token.as_str())
            .json(&body);
        if let Some(login_customer_id) = &self.credentials.login_customer_id {
            request = request.header("login-customer-id", login_customer_id.as_str());
        }

        info!("Submitting {} conversions to {}", events.len(), self.upload_url());
        let response = request
            .send()
            .await
            .map_err(|e| self.convert_request_error(e))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(%status, "upload_batch: API error");
            return Err(TransportError::from_status(status, text));
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.convert_request_error(e))?;
        parse_upload_response(&text)
    }

    fn name(&self) -> &str {
        "google-ads"
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_lifetime")]
    expires_in: u64,
}

fn default_token_lifetime() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUploadResponse {
    #[serde(default)]
    results: Vec<ApiConversionResult>,
    partial_failure_error: Option<ApiStatus>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiConversionResult {
    gclid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    code: Option<i32>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<ApiFailureDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiFailureDetail {
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiError {
    #[serde(default)]
    error_code: HashMap<String, serde_json::Value>,
    #[serde(default)]
    message: String,
    location: Option<ApiLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiLocation {
    #[serde(default)]
    field_path_elements: Vec<ApiFieldPathElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFieldPathElement {
    field_name: String,
    index: Option<usize>,
}

/// Parse an `uploadClickConversions` response body
pub fn parse_upload_response(body: &str) -> Result<UploadResponse, TransportError> {
    let api: ApiUploadResponse = serde_json::from_str(body)
        .map_err(|e| TransportError::InvalidResponse(format!("upload response: {}", e)))?;

    let results = api
        .results
        .into_iter()
        .map(|r| UploadedConversion { gclid: r.gclid })
        .collect();

    let per_item_errors = api.partial_failure_error.map(|status| {
        let mut errors: Vec<ItemError> = status
            .details
            .iter()
            .flat_map(|detail| detail.errors.iter())
            .map(|error| ItemError {
                index: conversion_index(error),
                code: error_code_name(&error.error_code),
                message: error.message.clone(),
            })
            .collect();

        // A status without structured details cannot be attributed
        if errors.is_empty() {
            errors.push(ItemError {
                index: None,
                code: status
                    .code
                    .map(|c| format!("STATUS_{}", c))
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
                message: status.message.clone(),
            });
        }
        errors
    });

    Ok(UploadResponse {
        results,
        per_item_errors,
    })
}

fn conversion_index(error: &ApiError) -> Option<usize> {
    error
        .location
        .as_ref()?
        .field_path_elements
        .iter()
        .find(|element| element.field_name == CONVERSIONS_FIELD)
        .and_then(|element| element.index)
}

/// `{"conversionUploadError": "UNPARSEABLE_GCLID"}` -> `conversionUploadError:UNPARSEABLE_GCLID`
fn error_code_name(error_code: &HashMap<String, serde_json::Value>) -> String {
    let mut entries: Vec<String> = error_code
        .iter()
        .map(|(category, value)| match value.as_str() {
            Some(code) => format!("{}:{}", category, code),
            None => format!("{}:{}", category, value),
        })
        .collect();
    entries.sort();

    if entries.is_empty() {
        "UNKNOWN".to_string()
    } else {
        entries.join(",")
    }
}
