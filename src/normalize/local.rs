//! Local file normalization: pure validation and base64 encoding, no I/O.

use crate::models::{CanonicalImage, ConversionResult, LocalFile};
use base64::Engine as _;

/// Upper bound for locally supplied files. The remote path allows 10 MiB; the
/// asymmetry is intentional (local guards client memory, remote guards fetch
/// cost).
pub const MAX_LOCAL_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Closed enumeration of accepted upload types. Never inferred from content.
pub const SUPPORTED_IMAGE_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Validate and encode a locally supplied file.
///
/// Checks run in order: presence, size, declared MIME type. Each constraint
/// fails with its own message so the caller can show a precise diagnostic.
pub fn normalize_local_file(source: &LocalFile) -> ConversionResult {
    if source.bytes.is_empty() {
        return ConversionResult::err("No image file provided.");
    }

    if source.byte_size > MAX_LOCAL_IMAGE_BYTES {
        return ConversionResult::err(
            "Image size exceeds 5MB limit. Please choose a smaller file.",
        );
    }

    if !SUPPORTED_IMAGE_TYPES.contains(&source.declared_mime_type.as_str()) {
        return ConversionResult::err(format!(
            "Unsupported image type: '{}'. Supported types: JPEG, PNG, WebP, GIF.",
            source.declared_mime_type
        ));
    }

    let base64_body = base64::engine::general_purpose::STANDARD.encode(&source.bytes);

    ConversionResult::ok(CanonicalImage {
        mime_type: source.declared_mime_type.clone(),
        base64_body,
    })
}

/// Map a file extension to the declared MIME type the validator expects.
///
/// Used by callers that start from a path rather than a browser file object.
/// Unknown extensions map to `None` and fail the closed-enumeration check
/// downstream.
pub fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
