//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! Request failures from the provider are not represented here; they travel
//! as [`crate::ai::ApiFailure`] values until the retry controller decides
//! the run is over.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("System instruction file not found or empty: {}", .0.display())]
    MissingInstruction(PathBuf),

    #[error("API key must not be empty")]
    EmptyCredential,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Terminal input error: {0}")]
    Terminal(String),

    #[error("Request with model '{model}' failed: {detail}")]
    RequestFailed { model: String, detail: String },

    #[error("Request with model '{model}' failed and retry was declined")]
    RetryDeclined { model: String },
}

impl Error {
    /// Process exit status for this error.
    ///
    /// Every fatal path exits with 1; successful runs (including runs that
    /// produced no text) exit with 0.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// True for errors raised before any network call was attempted.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Error::MissingInstruction(_) | Error::EmptyCredential | Error::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
