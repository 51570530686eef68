//! Operator interaction
//!
//! All reads from the person at the keyboard go through [`Operator`], so the
//! pipeline and the retry controller can be driven by scripted answers in
//! tests.

use crate::{Error, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::{Arc, Mutex};

pub trait Operator {
    /// Read a secret without echoing it.
    fn read_secret(&mut self, prompt: &str) -> Result<String>;

    /// Read one line of free text, without the trailing newline.
    fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// Show an informational message.
    fn say(&mut self, message: &str);

    /// Ask a yes/no question. Only an affirmative answer returns true.
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.read_line(&format!("{} [y/N]: ", question))?;
        Ok(is_affirmative(&answer))
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Strip pasted quote characters and whitespace from a file path.
pub fn sanitize_path_input(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| *c != '"' && *c != '\'').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Interactive stdin/stdout operator.
#[derive(Debug, Default)]
pub struct ConsoleOperator;

impl ConsoleOperator {
    pub fn new() -> Self {
        Self
    }

    fn prompt(prompt: &str) -> Result<()> {
        print!("{}", prompt);
        io::stdout()
            .flush()
            .map_err(|e| Error::Terminal(format!("failed to flush stdout: {}", e)))
    }

    fn read_stdin_line() -> Result<String> {
        let mut input = String::new();
        io::stdin()
            .lock()
            .read_line(&mut input)
            .map_err(|e| Error::Terminal(format!("failed to read stdin: {}", e)))?;
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }

    fn read_masked() -> Result<String> {
        terminal::enable_raw_mode()
            .map_err(|e| Error::Terminal(format!("failed to enter raw mode: {}", e)))?;
        let result = Self::read_masked_raw();
        let restored = terminal::disable_raw_mode();
        println!();
        restored.map_err(|e| Error::Terminal(format!("failed to leave raw mode: {}", e)))?;
        result
    }

    fn read_masked_raw() -> Result<String> {
        let mut secret = String::new();
        let mut stdout = io::stdout();

        loop {
            let event =
                event::read().map_err(|e| Error::Terminal(format!("failed to read key: {}", e)))?;
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event
            else {
                continue;
            };
            if kind == KeyEventKind::Release {
                continue;
            }

            match code {
                KeyCode::Enter => break,
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(Error::Terminal("input interrupted".to_string()));
                }
                KeyCode::Backspace => {
                    if secret.pop().is_some() {
                        let _ = write!(stdout, "\u{8} \u{8}");
                    }
                }
                KeyCode::Char(c) => {
                    secret.push(c);
                    let _ = write!(stdout, "*");
                }
                _ => {}
            }
            let _ = stdout.flush();
        }

        Ok(secret)
    }
}

impl Operator for ConsoleOperator {
    fn read_secret(&mut self, prompt: &str) -> Result<String> {
        Self::prompt(prompt)?;
        if io::stdin().is_terminal() {
            Self::read_masked()
        } else {
            Self::read_stdin_line()
        }
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        Self::prompt(prompt)?;
        Self::read_stdin_line()
    }

    fn say(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Operator that replays canned answers, for tests and harnesses.
///
/// Clones share the same transcript, so a test can keep a handle while the
/// app owns another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOperator {
    answers: Arc<Mutex<VecDeque<String>>>,
    transcript: Arc<Mutex<Vec<String>>>,
}

impl ScriptedOperator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(self, answer: impl Into<String>) -> Self {
        self.answers.lock().unwrap().push_back(answer.into());
        self
    }

    /// Every prompt and message shown so far, in order.
    pub fn transcript(&self) -> Vec<String> {
        self.transcript.lock().unwrap().clone()
    }

    /// Number of prompts that asked for input.
    pub fn prompts_shown(&self) -> usize {
        self.transcript
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.starts_with("? "))
            .count()
    }

    fn next_answer(&mut self, prompt: &str) -> Result<String> {
        self.transcript.lock().unwrap().push(format!("? {}", prompt));
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Terminal(format!("no scripted answer for '{}'", prompt)))
    }
}

impl Operator for ScriptedOperator {
    fn read_secret(&mut self, prompt: &str) -> Result<String> {
        self.next_answer(prompt)
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.next_answer(prompt)
    }

    fn say(&mut self, message: &str) {
        self.transcript.lock().unwrap().push(message.to_string());
    }
}
