//! Data models and structures
//!
//! Defines the image source variants, the canonical data-URI payload exchanged
//! between the normalizer and the poem generator, and the request/response
//! contracts shared with the presentation layer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A local file selected by the user, as handed over by the presentation layer.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub bytes: Vec<u8>,
    pub declared_mime_type: String,
    pub byte_size: u64,
}

/// A remote image location to be fetched over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteUrl {
    pub url: String,
}

/// Exactly one image source per acquisition attempt.
#[derive(Debug, Clone)]
pub enum ImageSource {
    LocalFile(LocalFile),
    RemoteUrl(RemoteUrl),
}

/// Validated, size-bounded image payload in `data:<mime>;base64,<body>` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalImage {
    pub mime_type: String,
    pub base64_body: String,
}

impl CanonicalImage {
    /// Render the canonical wire format. This is the only accepted encoding;
    /// no URL-encoded alternative exists.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_body)
    }

    /// Parse and validate a data URI back into its parts.
    ///
    /// Rejects anything that is not exactly `data:image/<subtype>;base64,<body>`
    /// with a distinct message per missing piece.
    pub fn from_data_uri(uri: &str) -> crate::Result<Self> {
        let rest = uri.strip_prefix("data:").ok_or_else(|| {
            crate::Error::Validation("Photo payload must use the data: scheme".to_string())
        })?;

        let (mime_type, base64_body) = rest.split_once(";base64,").ok_or_else(|| {
            crate::Error::Validation(
                "Photo payload must carry a ;base64, encoding marker".to_string(),
            )
        })?;

        if !mime_type.starts_with("image/") {
            return Err(crate::Error::Validation(format!(
                "Photo payload must carry an image MIME type, got '{}'",
                mime_type
            )));
        }

        if base64_body.is_empty() {
            return Err(crate::Error::Validation(
                "Photo payload contains no image data".to_string(),
            ));
        }

        Ok(Self {
            mime_type: mime_type.to_string(),
            base64_body: base64_body.to_string(),
        })
    }
}

/// Outcome of a normalization attempt, shaped for the presentation boundary.
///
/// Exactly one of `canonical_image`/`error_message` is set, matching `success`.
/// Construct through [`ConversionResult::ok`] and [`ConversionResult::err`] to
/// keep that invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_image: Option<CanonicalImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ConversionResult {
    pub fn ok(image: CanonicalImage) -> Self {
        Self {
            success: true,
            canonical_image: Some(image),
            error_message: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            canonical_image: None,
            error_message: Some(message.into()),
        }
    }

    /// Convert back into a `Result` for Rust callers.
    pub fn into_result(self) -> crate::Result<CanonicalImage> {
        match (self.canonical_image, self.error_message) {
            (Some(image), _) => Ok(image),
            (None, Some(message)) => Err(crate::Error::Validation(message)),
            (None, None) => Err(crate::Error::Generic(
                "Conversion result carried neither image nor error".to_string(),
            )),
        }
    }
}

impl From<crate::Result<CanonicalImage>> for ConversionResult {
    fn from(result: crate::Result<CanonicalImage>) -> Self {
        match result {
            Ok(image) => Self::ok(image),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

/// Request contract for poem generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoemRequest {
    pub photo_data_uri: String,
}

/// Response contract for poem generation. `poem` is non-empty on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoemResponse {
    pub poem: String,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub poem_model: String,
    pub fetch_timeout: Duration,
    pub generation_timeout: Duration,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .map_err(|_| crate::Error::Generic("GEMINI_API_KEY not set".to_string()))?,
            poem_model: std::env::var("POEM_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            fetch_timeout: Duration::from_secs(Self::timeout_var("FETCH_TIMEOUT_SECS", 30)?),
            generation_timeout: Duration::from_secs(Self::timeout_var(
                "GENERATION_TIMEOUT_SECS",
                60,
            )?),
        })
    }

    fn timeout_var(name: &str, default: u64) -> crate::Result<u64> {
        match std::env::var(name) {
            Ok(raw) => raw
                .parse()
                .map_err(|_| crate::Error::Generic(format!("{} must be a whole number", name))),
            Err(_) => Ok(default),
        }
    }
}
