//! Application orchestration for one question/answer run.

use crate::ai::gemini::{build_request, load_image, ImageAttachment, PromptInput};
use crate::ai::{GeminiHttpClient, GenerationService};
use crate::instruction::load_instruction;
use crate::models::{Config, RunConfig};
use crate::output::{open_in_viewer, write_response, WriteOutcome};
use crate::retry::run_with_fallback;
use crate::terminal::{sanitize_path_input, ConsoleOperator, Operator};
use crate::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Builds the generation service once the credential is known.
pub type ServiceFactory = Box<dyn Fn(&Config, &str) -> Box<dyn GenerationService>>;

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub operator: Box<dyn Operator>,
    pub generation: ServiceFactory,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub model: String,
    pub retried: bool,
    pub output: WriteOutcome,
}

pub struct App {
    config: Config,
    operator: Box<dyn Operator>,
    generation: ServiceFactory,
    model_choice: Option<String>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(config: Config, services: AppServices) -> Self {
        Self {
            config,
            operator: services.operator,
            generation: services.generation,
            model_choice: None,
        }
    }

    /// Interactive app talking to the real Gemini endpoint.
    pub fn new(config: Config) -> Self {
        Self::with_services(
            config,
            AppServices {
                operator: Box::new(ConsoleOperator::new()),
                generation: Box::new(|config: &Config, api_key: &str| {
                    Box::new(
                        GeminiHttpClient::new(api_key.to_string())
                            .with_base_url(config.base_url.clone())
                            .with_timeout(config.timeout),
                    ) as Box<dyn GenerationService>
                }),
            },
        )
    }

    /// Pre-answer the model prompt. The value still goes through selection.
    pub fn with_model_choice(mut self, choice: Option<String>) -> Self {
        self.model_choice = choice;
        self
    }

    pub async fn run(&mut self) -> Result<RunOutcome> {
        // Must fail before any prompt is shown.
        let system_instruction = load_instruction(&self.config.instruction_path)?;

        let run = self.collect_run_config(system_instruction)?;
        info!("Resolved model: {}", run.model);

        let image = match &run.prompt.image_path {
            Some(path) => match load_image(path)? {
                ImageAttachment::Attached(inline_data) => Some(inline_data),
                ImageAttachment::Missing(path) => {
                    self.operator.say(&format!(
                        "Warning: image '{}' not found, sending the question without it.",
                        path.display()
                    ));
                    None
                }
            },
            None => None,
        };
        let request = build_request(&run.system_instruction, &run.prompt.text, image.as_ref());

        let service = (self.generation)(&self.config, &run.api_key);
        let completion = run_with_fallback(
            service.as_ref(),
            self.operator.as_mut(),
            &request,
            &run.model,
            &self.config.catalog,
        )
        .await?;

        let output = write_response(&completion.response, &self.config.output_path)?;
        match &output {
            WriteOutcome::Written { path, .. } => {
                self.operator
                    .say(&format!("Response saved to {}", path.display()));
                if self.config.open_viewer {
                    open_in_viewer(path);
                }
            }
            WriteOutcome::NoContent { response_json } => {
                self.operator
                    .say("The model returned no text. Full response:");
                self.operator.say(response_json);
            }
        }

        Ok(RunOutcome {
            model: completion.model,
            retried: completion.retried,
            output,
        })
    }

    fn collect_run_config(&mut self, system_instruction: String) -> Result<RunConfig> {
        let api_key = match &self.config.api_key {
            Some(key) => key.clone(),
            None => self
                .operator
                .read_secret("Enter your Gemini API key: ")?
                .trim()
                .to_string(),
        };
        if api_key.is_empty() {
            return Err(Error::EmptyCredential);
        }

        let choice = match self.model_choice.clone() {
            Some(choice) => choice,
            None => {
                self.operator.say("Available models:");
                self.operator.say(&self.config.catalog.menu());
                self.operator
                    .read_line("Choose a model (number or name, Enter for default): ")?
            }
        };
        let selection = self.config.catalog.resolve(&choice);
        if let Some(warning) = &selection.warning {
            self.operator.say(&format!("Warning: {}.", warning));
        }

        let text = self.operator.read_line("Your question: ")?;
        let image_path = sanitize_path_input(
            &self
                .operator
                .read_line("Image path (optional, Enter to skip): ")?,
        )
        .map(PathBuf::from);

        Ok(RunConfig {
            system_instruction,
            api_key,
            model: selection.model,
            prompt: PromptInput { text, image_path },
        })
    }
}
