//! Interactive confirmation.
//!
//! Prompts only happen when a run is serial; handlers receive a [`Prompter`]
//! so tests and non-interactive runs can answer without a terminal.

use std::io::{self, BufRead, Write};

pub trait Prompter: Send + Sync {
    /// Ask a yes/no question. Anything but an explicit yes is a no.
    fn confirm(&self, question: &str) -> bool;

    /// Show generated text before asking about it.
    fn show(&self, _text: &str) {}
}

/// Reads answers from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&self, question: &str) -> bool {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "{question} [y/N] ");
        let _ = stdout.flush();
        drop(stdout);

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }

    fn show(&self, text: &str) {
        println!("  {text}\n");
    }
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Prompter for FixedAnswer {
    fn confirm(&self, question: &str) -> bool {
        tracing::debug!(question, answer = self.0, "answered without prompting");
        self.0
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
