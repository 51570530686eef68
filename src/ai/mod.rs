//! Generative-language API integration
//!
//! [`GenerationService`] is the seam between the pipeline and the provider:
//! the Gemini REST client implements it for real runs and
//! [`MockGenerationClient`] for tests.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{GeminiHttpClient, GenerateContentRequest, GenerateContentResponse};
pub use mock::MockGenerationClient;

use async_trait::async_trait;
use thiserror::Error;

/// Why a single `generateContent` call did not produce a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiFailure {
    /// The server answered with a non-2xx status.
    #[error("API error (status {status}): {body}")]
    Status { status: u16, body: String },

    /// No usable response arrived at all.
    #[error("Request failed: {0}")]
    Transport(String),

    /// A 2xx response whose body was not a valid response document.
    #[error("Failed to parse response: {message}\nBody: {body}")]
    Decode { message: String, body: String },
}

pub type ApiResult = std::result::Result<GenerateContentResponse, ApiFailure>;

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Issue exactly one request against `model`.
    async fn generate(&self, model: &str, request: &GenerateContentRequest) -> ApiResult;
}
