use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::ai::{ApiFailure, ApiResult, GenerationService};
use crate::catalog::bare_model_id;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini REST client for `generateContent`.
///
/// One call to [`GenerationService::generate`] is exactly one POST: there is
/// no internal retry, and no timeout beyond the transport default unless one
/// is configured.
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl GeminiHttpClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_client(api_key, Client::new())
    }

    pub fn new_with_client(api_key: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint for a model. Accepts bare IDs and `models/`-prefixed IDs.
    pub fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            bare_model_id(model)
        )
    }
}

#[async_trait]
impl GenerationService for GeminiHttpClient {
    async fn generate(&self, model: &str, request: &GenerateContentRequest) -> ApiResult {
        let url = self.endpoint(model);
        tracing::debug!("Sending generateContent request for model {}", model);

        let mut builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request to Gemini: {}", e);
            ApiFailure::Transport(e.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read Gemini response body: {}", e);
            ApiFailure::Transport(e.to_string())
        })?;

        if !status.is_success() {
            tracing::debug!("Gemini API error (status {}): {}", status, body);
            return Err(ApiFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<GenerateContentResponse>(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            ApiFailure::Decode {
                message: e.to_string(),
                body,
            }
        })
    }
}
