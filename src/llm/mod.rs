//! Generative model access: request shape, Gemini client, retry, and
//! candidate normalization.

pub mod candidates;
pub mod gemini;
pub mod retry;

use async_trait::async_trait;

use crate::error::GenerateError;

pub use candidates::{normalize_candidates, strip_quotes};
pub use gemini::GeminiClient;
pub use retry::{RetryPolicy, retry_with_backoff};

/// Fixed sampling parameters for every request.
pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 1.0;
pub const MAX_OUTPUT_TOKENS: u32 = 200;

/// One generation call: rendered instructions plus the diff.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub instructions: String,
    pub diff: String,
    pub candidate_count: u8,
}

/// Trait for calling a generative text model.
///
/// Returns raw candidate texts in generation order; quote stripping and
/// deduplication happen in [`normalize_candidates`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, GenerateError>;
}
