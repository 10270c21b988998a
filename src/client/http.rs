//! HTTP Client
//!
//! Thin async JSON transport for the generation service. No retry happens
//! here; retrying is left to the caller so each attempt draws a fresh key.

use crate::credentials::Credential;
use crate::error::{Result, TaleforgeError, UpstreamError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Longest error body kept verbatim in an error message
const MAX_ERROR_BODY: usize = 500;

/// HTTP client for JSON requests authenticated by a credential header
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with the given transport timeouts
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| {
                TaleforgeError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// POST `body` as JSON and decode a JSON response
    pub async fn post_json<T, R>(
        &self,
        url: &str,
        body: &T,
        credential: &Credential,
    ) -> std::result::Result<R, UpstreamError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(credential.expose())
            .map_err(|e| UpstreamError::InvalidCredential(e.to_string()))?;
        key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);

        debug!(url, key_suffix = credential.suffix(), "POST");

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&text).map_err(UpstreamError::from);
        }

        debug!(status = status.as_u16(), "Upstream returned an error status");
        Err(UpstreamError::Api {
            status: status.as_u16(),
            message: describe_error_body(&text),
        })
    }
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Render an error body as `STATUS: message` when it is a Google error
/// envelope, otherwise as the (truncated) raw text
fn describe_error_body(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return match envelope.error.status {
            Some(status) => format!("{}: {}", status, envelope.error.message),
            None => envelope.error.message,
        };
    }

    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
