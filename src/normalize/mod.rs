//! Image normalization
//!
//! Converts heterogeneous image sources (local file upload or remote URL) into
//! the canonical data-URI payload consumed by the poem generator.

pub mod local;
pub mod remote;

pub use local::{
    mime_type_for_extension, normalize_local_file, MAX_LOCAL_IMAGE_BYTES, SUPPORTED_IMAGE_TYPES,
};
pub use remote::{RemoteImageFetcher, MAX_REMOTE_IMAGE_BYTES};
