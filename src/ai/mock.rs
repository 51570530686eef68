use super::{ApiFailure, ApiResult, GenerateContentRequest, GenerationService};
use crate::ai::gemini::{Candidate, Content, GenerateContentResponse, Part};
use async_trait::async_trait;
use serde_json::Map;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Scripted stand-in for the Gemini client.
///
/// Results are handed out in the order they were queued; once the queue is
/// empty every call fails with a transport error. Every call's model and
/// request are recorded. Clones share state.
#[derive(Clone, Default)]
pub struct MockGenerationClient {
    results: Arc<Mutex<VecDeque<ApiResult>>>,
    calls: Arc<Mutex<Vec<(String, GenerateContentRequest)>>>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(self, result: ApiResult) -> Self {
        self.results.lock().unwrap().push_back(result);
        self
    }

    /// Queue a success with one candidate holding the given text parts.
    pub fn with_text_response(self, parts: &[&str]) -> Self {
        self.with_result(Ok(text_response(parts)))
    }

    pub fn with_failure(self, status: u16, body: &str) -> Self {
        self.with_result(Err(ApiFailure::Status {
            status,
            body: body.to_string(),
        }))
    }

    /// Models requested so far, in call order.
    pub fn called_models(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }
}

/// A response with a single candidate whose parts are `parts`.
pub fn text_response(parts: &[&str]) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(Content {
                role: Some("model".to_string()),
                parts: parts.iter().map(|text| Part::text(*text)).collect(),
            }),
            extra: Map::new(),
        }],
        extra: Map::new(),
    }
}

#[async_trait]
impl GenerationService for MockGenerationClient {
    async fn generate(&self, model: &str, request: &GenerateContentRequest) -> ApiResult {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), request.clone()));

        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiFailure::Transport("no mock result queued".to_string())))
    }
}
