//! Core pipeline for photopoem - turns a photograph into a generated poem
//!
//! Two stages, invoked sequentially: the normalizer converts a local file or
//! remote URL into a canonical base64 data URI, and the poem generator embeds
//! that payload in a vision prompt and returns the generated text.

pub mod ai;
pub mod app;
pub mod error;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod track;

pub use error::{Error, Result};
