//! Persisting the model's answer.

use crate::ai::GenerateContentResponse;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_FILE: &str = "response.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { path: PathBuf, bytes: usize },
    /// No text came back; carries the pretty-printed response for display.
    NoContent { response_json: String },
}

/// Text parts of the first candidate that has any, joined with newlines.
pub fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    response.candidates.iter().find_map(|candidate| {
        let parts: Vec<&str> = candidate.text_parts().collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    })
}

/// Write the response text to `path` as UTF-8, replacing any previous file.
/// Nothing is written when the response has no text.
pub fn write_response(response: &GenerateContentResponse, path: &Path) -> Result<WriteOutcome> {
    match extract_text(response) {
        Some(text) => {
            fs::write(path, text.as_bytes())?;
            tracing::info!("Wrote {} bytes to {}", text.len(), path.display());
            Ok(WriteOutcome::Written {
                path: path.to_path_buf(),
                bytes: text.len(),
            })
        }
        None => {
            tracing::info!("Response contained no text; nothing written");
            Ok(WriteOutcome::NoContent {
                response_json: serde_json::to_string_pretty(response)?,
            })
        }
    }
}

/// Best-effort: open the file in the platform's default viewer.
pub fn open_in_viewer(path: &Path) {
    if let Err(e) = open::that(path) {
        tracing::warn!("Could not open {} in a viewer: {}", path.display(), e);
    }
}
