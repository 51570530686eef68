//! Single-retry fallback to the default model
//!
//! A run makes at most two calls. The first uses the resolved model. If that
//! fails and the model was not the default, the operator is asked whether to
//! retry once with the default model. Nothing is ever retried silently.

use crate::ai::{ApiFailure, GenerateContentRequest, GenerateContentResponse, GenerationService};
use crate::catalog::ModelCatalog;
use crate::terminal::Operator;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum RetryState {
    Idle,
    Attempting { model: String, is_retry: bool },
    AwaitingConfirmation { failed_model: String },
    Succeeded { model: String },
    Failed { model: String, declined: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryEvent {
    Start(String),
    CallSucceeded,
    CallFailed,
    Answered(bool),
}

impl RetryState {
    /// Pure transition function. Events that make no sense in the current
    /// state leave it unchanged.
    pub fn next(self, event: RetryEvent, catalog: &ModelCatalog) -> RetryState {
        match (self, event) {
            (RetryState::Idle, RetryEvent::Start(model)) => RetryState::Attempting {
                model,
                is_retry: false,
            },
            (RetryState::Attempting { model, .. }, RetryEvent::CallSucceeded) => {
                RetryState::Succeeded { model }
            }
            (RetryState::Attempting { model, is_retry }, RetryEvent::CallFailed) => {
                if is_retry || catalog.is_default(&model) {
                    RetryState::Failed {
                        model,
                        declined: false,
                    }
                } else {
                    RetryState::AwaitingConfirmation {
                        failed_model: model,
                    }
                }
            }
            (RetryState::AwaitingConfirmation { .. }, RetryEvent::Answered(true)) => {
                RetryState::Attempting {
                    model: catalog.default_model().to_string(),
                    is_retry: true,
                }
            }
            (RetryState::AwaitingConfirmation { failed_model }, RetryEvent::Answered(false)) => {
                RetryState::Failed {
                    model: failed_model,
                    declined: true,
                }
            }
            (state, _) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RetryState::Succeeded { .. } | RetryState::Failed { .. }
        )
    }
}

/// A successful call and the model that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub model: String,
    pub response: GenerateContentResponse,
    pub retried: bool,
}

/// Drive the state machine to a terminal state.
pub async fn run_with_fallback(
    service: &dyn GenerationService,
    operator: &mut dyn Operator,
    request: &GenerateContentRequest,
    model: &str,
    catalog: &ModelCatalog,
) -> Result<Completion> {
    let mut state = RetryState::Idle.next(RetryEvent::Start(model.to_string()), catalog);
    let mut last_failure: Option<ApiFailure> = None;
    let mut response: Option<GenerateContentResponse> = None;
    let mut calls = 0usize;

    while !state.is_terminal() {
        let event = match &state {
            RetryState::Attempting { model, is_retry } => {
                tracing::info!(
                    "Calling model {}{}",
                    model,
                    if *is_retry { " (retry)" } else { "" }
                );
                calls += 1;
                match service.generate(model, request).await {
                    Ok(resp) => {
                        response = Some(resp);
                        RetryEvent::CallSucceeded
                    }
                    Err(failure) => {
                        tracing::warn!("Model {} failed: {}", model, failure);
                        operator.say(&format!("Request with model '{}' failed.", model));
                        operator.say(&failure.to_string());
                        last_failure = Some(failure);
                        RetryEvent::CallFailed
                    }
                }
            }
            RetryState::AwaitingConfirmation { failed_model } => {
                let answer = operator.confirm(&format!(
                    "Model '{}' failed. Retry once with the default model '{}'?",
                    failed_model,
                    catalog.default_model()
                ))?;
                RetryEvent::Answered(answer)
            }
            RetryState::Idle | RetryState::Succeeded { .. } | RetryState::Failed { .. } => break,
        };
        state = state.next(event, catalog);
    }

    match state {
        RetryState::Succeeded { model } => {
            let response = response.ok_or_else(|| Error::RequestFailed {
                model: model.clone(),
                detail: "no response recorded".to_string(),
            })?;
            Ok(Completion {
                model,
                retried: calls > 1,
                response,
            })
        }
        RetryState::Failed {
            model,
            declined: true,
        } => Err(Error::RetryDeclined { model }),
        RetryState::Failed { model, .. } => Err(Error::RequestFailed {
            model,
            detail: last_failure
                .map(|f| f.to_string())
                .unwrap_or_else(|| "unknown failure".to_string()),
        }),
        RetryState::Idle
        | RetryState::Attempting { .. }
        | RetryState::AwaitingConfirmation { .. } => Err(Error::RequestFailed {
            model: model.to_string(),
            detail: "retry controller stopped early".to_string(),
        }),
    }
}
