//! Model catalog and selection
//!
//! Resolves whatever the operator typed at the model prompt into exactly one
//! model identifier. Resolution never fails: unknown input is passed through
//! verbatim and retired identifiers fall back to the default.

use crate::{Error, Result};

pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-2.5-pro",
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite",
    "gemini-3-pro-preview",
    "gemini-3-flash-preview",
];

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Version markers of retired model generations.
pub const DENIED_MARKERS: &[&str] = &["2.0"];

/// Model ID without the optional `models/` resource prefix.
pub fn bare_model_id(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

/// Soft warning produced while resolving a model choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionWarning {
    /// Input named a retired model; the default was used instead.
    Denied { requested: String, marker: String },
}

impl std::fmt::Display for SelectionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionWarning::Denied { requested, marker } => write!(
                f,
                "Model '{}' belongs to the retired '{}' generation; using the default instead",
                requested, marker
            ),
        }
    }
}

/// Outcome of resolving a model choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub model: String,
    pub warning: Option<SelectionWarning>,
}

impl Selection {
    fn plain(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            warning: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    models: Vec<String>,
    default: String,
    denied_markers: Vec<String>,
}

impl ModelCatalog {
    /// Build a catalog. The default must be one of `models`.
    pub fn new(models: Vec<String>, default: String) -> Result<Self> {
        if models.is_empty() {
            return Err(Error::Config("model catalog is empty".to_string()));
        }
        if !models.contains(&default) {
            return Err(Error::Config(format!(
                "default model '{}' is not in the catalog",
                default
            )));
        }

        Ok(Self {
            models,
            default,
            denied_markers: DENIED_MARKERS.iter().map(|m| m.to_string()).collect(),
        })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn default_model(&self) -> &str {
        &self.default
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// True when `model` names the default, with or without `models/`.
    pub fn is_default(&self, model: &str) -> bool {
        bare_model_id(model) == self.default
    }

    /// Resolve raw operator input. First match wins:
    /// empty input, 1-based index, exact name, denied marker, passthrough.
    pub fn resolve(&self, input: &str) -> Selection {
        let trimmed = bare_model_id(input.trim());

        if trimmed.is_empty() {
            return Selection::plain(&self.default);
        }

        if let Some(model) = self.by_index(trimmed) {
            return Selection::plain(model);
        }

        // Case-sensitive; only the `models/` prefix is stripped.
        if let Some(model) = self.models.iter().find(|m| m.as_str() == trimmed) {
            return Selection::plain(model);
        }

        if let Some(marker) = self
            .denied_markers
            .iter()
            .find(|marker| trimmed.contains(marker.as_str()))
        {
            tracing::warn!(
                "Model '{}' matches denied marker '{}', falling back to {}",
                trimmed,
                marker,
                self.default
            );
            return Selection {
                model: self.default.clone(),
                warning: Some(SelectionWarning::Denied {
                    requested: trimmed.to_string(),
                    marker: marker.clone(),
                }),
            };
        }

        tracing::debug!("Accepting unlisted model '{}' verbatim", trimmed);
        Selection::plain(trimmed)
    }

    fn by_index(&self, input: &str) -> Option<&str> {
        if !input.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index: usize = input.parse().ok()?;
        if (1..=self.models.len()).contains(&index) {
            Some(&self.models[index - 1])
        } else {
            None
        }
    }

    /// Numbered listing shown at the model prompt.
    pub fn menu(&self) -> String {
        self.models
            .iter()
            .enumerate()
            .map(|(i, model)| {
                if *model == self.default {
                    format!("  {}. {} (default)", i + 1, model)
                } else {
                    format!("  {}. {}", i + 1, model)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self {
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            default: DEFAULT_MODEL.to_string(),
            denied_markers: DENIED_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}
