//! AI service integration for poem generation
//!
//! Provides the vision-model interface that turns a canonical image payload
//! into a poem through a schema-validated request/response contract.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiPoemClient;
pub use mock::MockPoemClient;

use crate::models::{PoemRequest, PoemResponse};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PoemService: Send + Sync {
    /// Generate a poem for the given canonical photo payload.
    ///
    /// Stateless across calls; concurrent invocations have independent
    /// outcomes. Fails with `Error::Generation` on schema violations and
    /// model failures alike.
    async fn generate_poem(&self, request: &PoemRequest) -> Result<PoemResponse>;
}
