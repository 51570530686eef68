//! Ask a Gemini model one question from the terminal
//!
//! Reads a system instruction from disk, collects a credential, a model
//! choice, a question and an optional image from the operator, sends one
//! `generateContent` request (with at most one operator-approved fallback to
//! the default model) and saves the answer to a file.

pub mod ai;
pub mod app;
pub mod catalog;
pub mod error;
pub mod instruction;
pub mod models;
pub mod output;
pub mod retry;
pub mod terminal;

pub use error::{Error, Result};
