//! Configuration and per-run data
//!
//! [`Config`] is read once from the environment (and `.env`); [`RunConfig`]
//! is the immutable bundle of everything one run sends to the provider.

use crate::ai::gemini::client::DEFAULT_BASE_URL;
use crate::ai::gemini::PromptInput;
use crate::catalog::{ModelCatalog, DEFAULT_MODEL};
use crate::instruction::default_instruction_path;
use crate::output::DEFAULT_OUTPUT_FILE;
use crate::Result;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub instruction_path: PathBuf,
    pub output_path: PathBuf,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub catalog: ModelCatalog,
    pub open_viewer: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Result<Self> {
        let catalog = match get_var("GEMINI_MODELS") {
            Some(raw) if !raw.trim().is_empty() => {
                let models: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect();
                let default = non_empty(get_var("GEMINI_DEFAULT_MODEL"))
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string());
                ModelCatalog::new(models, default)?
            }
            _ => match non_empty(get_var("GEMINI_DEFAULT_MODEL")) {
                Some(default) => ModelCatalog::new(
                    ModelCatalog::default().models().to_vec(),
                    default,
                )?,
                None => ModelCatalog::default(),
            },
        };

        Ok(Self {
            instruction_path: non_empty(get_var("GEMINI_INSTRUCTION_PATH"))
                .map(PathBuf::from)
                .unwrap_or_else(default_instruction_path),
            output_path: non_empty(get_var("GEMINI_OUTPUT_PATH"))
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
            api_key: non_empty(get_var("GEMINI_API_KEY")),
            base_url: non_empty(get_var("GEMINI_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: parse_timeout_secs(get_var("GEMINI_TIMEOUT_SECS").as_deref()),
            catalog,
            open_viewer: parse_bool(get_var("GEMINI_OPEN_VIEWER").as_deref(), true),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_timeout_secs(raw: Option<&str>) -> Option<Duration> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

/// Everything a single run sends. Built once, never mutated.
#[derive(Clone)]
pub struct RunConfig {
    pub system_instruction: String,
    pub api_key: String,
    pub model: String,
    pub prompt: PromptInput,
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("system_instruction", &self.system_instruction)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("prompt", &self.prompt)
            .finish()
    }
}
