//! Image generation upstream client
//!
//! Forwards a prompt to the configured generation endpoint and returns the
//! URL of the generated image.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Default upper bound on a single upstream call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Image generation errors
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image generation endpoint not configured")]
    NotConfigured,

    #[error("image generation timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("upstream returned {0}")]
    Status(StatusCode),
}

impl From<reqwest::Error> for ImageError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ImageError::Timeout
        } else {
            ImageError::Http(e)
        }
    }
}

/// Outbound request body
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

/// Upstream response; only `url` is used
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    url: Option<String>,
}

/// Client for the external image generation API
#[derive(Debug, Clone)]
pub struct ImageClient {
    client: Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl ImageClient {
    /// Create a new client. `endpoint` of None leaves the client unconfigured.
    pub fn new(
        endpoint: Option<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ImageError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ImageError::Http)?;

        Ok(Self {
            client,
            endpoint: endpoint.filter(|s| !s.is_empty()),
            api_key: api_key.filter(|s| !s.is_empty()),
        })
    }

    /// Check if an endpoint is configured
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Generate an image for `prompt`, returning its URL
    ///
    /// A response without a `url` field yields an empty string.
    pub async fn generate(&self, prompt: &str) -> Result<String, ImageError> {
        let endpoint = self.endpoint.as_ref().ok_or(ImageError::NotConfigured)?;

        debug!("Sending image generation request to {}", endpoint);

        let mut request = self.client.post(endpoint).json(&GenerateRequest { prompt });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Image API error: {} - {}", status, body);
            return Err(ImageError::Status(status));
        }

        let generated: GenerateResponse = response.json().await?;
        Ok(generated.url.unwrap_or_default())
    }
}
