//! Assembly of `generateContent` request payloads.

use super::types::{Content, GenerateContentRequest, InlineData, Part};
use crate::ai::mime::image_mime_from_path;
use crate::Result;
use base64::Engine as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The operator's question plus an optional image to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptInput {
    pub text: String,
    pub image_path: Option<PathBuf>,
}

/// Result of trying to attach an image.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageAttachment {
    Attached(InlineData),
    /// The path did not exist; the request goes out text-only.
    Missing(PathBuf),
}

/// Read and base64-encode an image.
///
/// A missing file is not an error; other read failures are.
pub fn load_image(path: &Path) -> Result<ImageAttachment> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("Image not found at {}, sending text only", path.display());
            return Ok(ImageAttachment::Missing(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let mime_type = image_mime_from_path(path);
    tracing::debug!(
        "Attaching image {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        mime_type
    );

    Ok(ImageAttachment::Attached(InlineData {
        mime_type: mime_type.to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(bytes),
    }))
}

/// Build the request body: one system-instruction part, then a user turn
/// with the text part followed by the image part when one is given.
pub fn build_request(
    system_instruction: &str,
    prompt: &str,
    image: Option<&InlineData>,
) -> GenerateContentRequest {
    let mut parts = vec![Part::text(prompt)];
    if let Some(inline_data) = image {
        parts.push(Part::InlineData {
            inline_data: inline_data.clone(),
        });
    }

    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part::text(system_instruction)],
        },
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
    }
}
