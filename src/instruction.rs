//! Loading of the system instruction sent with every request.

use crate::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const INSTRUCTION_FILE_NAME: &str = "system_instruction.txt";

/// Default location: next to the running executable, falling back to the
/// working directory when the executable path is unavailable.
pub fn default_instruction_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(INSTRUCTION_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(INSTRUCTION_FILE_NAME))
}

/// Read the instruction file. A missing or blank file is fatal.
pub fn load_instruction(path: &Path) -> Result<String> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::MissingInstruction(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    if text.trim().is_empty() {
        return Err(Error::MissingInstruction(path.to_path_buf()));
    }

    tracing::info!(
        "Loaded system instruction from {} ({} bytes)",
        path.display(),
        text.len()
    );
    Ok(text)
}
