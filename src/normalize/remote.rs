//! Remote URL normalization: one outbound GET per call, full-body buffering,
//! content-type and size enforcement.

use crate::models::{CanonicalImage, ConversionResult, ImageSource};
use crate::normalize::local::normalize_local_file;
use crate::{Error, Result};
use base64::Engine as _;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// Upper bound for fetched bodies, checked after the body is fully buffered.
/// Streaming truncation is not attempted at this scope.
pub const MAX_REMOTE_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Some image hosts reject requests with default or empty agents, so the fetch
/// always presents a realistic browser identity.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches remote images and normalizes them into canonical payloads.
///
/// One request per call, no retries. The timeout is explicit rather than
/// inherited from transport defaults.
pub struct RemoteImageFetcher {
    client: Client,
    timeout: Duration,
}

impl RemoteImageFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self::new_with_client(timeout, Client::new())
    }

    pub fn new_with_client(timeout: Duration, client: Client) -> Self {
        Self { client, timeout }
    }

    /// Normalize either source variant through a single entry point.
    pub async fn normalize(&self, source: &ImageSource) -> ConversionResult {
        match source {
            ImageSource::LocalFile(file) => normalize_local_file(file),
            ImageSource::RemoteUrl(remote) => self.normalize_remote_url(&remote.url).await,
        }
    }

    /// Fetch `url` and normalize the response body into a canonical payload.
    ///
    /// Every failure mode collapses into a `ConversionResult` with a
    /// user-facing message; raw transport errors are never surfaced.
    pub async fn normalize_remote_url(&self, url: &str) -> ConversionResult {
        self.fetch(url).await.into()
    }

    async fn fetch(&self, url: &str) -> Result<CanonicalImage> {
        let parsed = url::Url::parse(url)
            .map_err(|_| Error::Validation("Invalid URL format.".to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::Validation("Invalid URL format.".to_string()));
        }

        tracing::debug!("Fetching remote image from {}", parsed);

        let response = self
            .client
            .get(parsed)
            .timeout(self.timeout)
            .header("User-Agent", BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Image fetch failed before a response arrived: {}", e);
                Error::Fetch(
                    "Network error or invalid URL. Please check the URL and try again."
                        .to_string(),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Image fetch returned status {}: {}", status, body);
            let message = extract_json_error(&body)
                .or_else(|| {
                    status
                        .canonical_reason()
                        .map(|reason| {
                            format!(
                                "Failed to fetch image: {} {}",
                                status.as_u16(),
                                reason
                            )
                        })
                })
                .unwrap_or_else(|| {
                    format!("Failed to fetch image (status {})", status.as_u16())
                });
            return Err(Error::Fetch(message));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mime_type = match content_type {
            None => {
                return Err(Error::Fetch(
                    "URL response carried no content-type header.".to_string(),
                ))
            }
            Some(observed) => {
                // Strip parameters such as `; charset=utf-8` for the canonical
                // MIME type, but name the raw header in the failure message.
                let media_type = observed
                    .split(';')
                    .next()
                    .unwrap_or("")
                    .trim()
                    .to_string();
                if !media_type.starts_with("image/") {
                    return Err(Error::Fetch(format!(
                        "URL did not return an image (content-type: {})",
                        observed
                    )));
                }
                media_type
            }
        };

        let body = response.bytes().await.map_err(|e| {
            tracing::warn!("Image fetch aborted while reading the body: {}", e);
            Error::Fetch(
                "Network error or invalid URL. Please check the URL and try again.".to_string(),
            )
        })?;

        if body.is_empty() {
            return Err(Error::Fetch("Fetched image is empty.".to_string()));
        }

        if body.len() > MAX_REMOTE_IMAGE_BYTES {
            return Err(Error::Fetch("Image size exceeds 10MB limit.".to_string()));
        }

        tracing::debug!("Fetched {} bytes of {}", body.len(), mime_type);

        Ok(CanonicalImage {
            mime_type,
            base64_body: base64::engine::general_purpose::STANDARD.encode(&body),
        })
    }
}

/// Pull a human-readable message out of a JSON error body, if there is one.
fn extract_json_error(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let message = value
        .get("error")
        .and_then(|error| {
            error
                .get("message")
                .and_then(|m| m.as_str())
                .or_else(|| error.as_str())
        })
        .or_else(|| value.get("message").and_then(|m| m.as_str()))?;

    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}
