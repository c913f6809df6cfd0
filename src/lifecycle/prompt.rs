//! Line-oriented operator I/O
//!
//! Steps talk to a `Prompter` rather than to stdin directly, so the same
//! workflow can run against the console or against a scripted answer list.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed while waiting for: {0}")]
    Closed(String),
    #[error("no scripted answer left for: {0}")]
    Exhausted(String),
    #[error("failed to read input")]
    Io(#[from] io::Error),
}

/// Trait for prompt implementations - console for operators, scripted for tests
pub trait Prompter {
    /// Show `question` and return the answer without its line ending
    fn ask(&mut self, question: &str) -> Result<String, PromptError>;
    fn say(&mut self, message: &str);
}

/// Prompts on stdout, answers from stdin
pub struct ConsolePrompter<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl ConsolePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed(question.trim().to_string()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, message: &str) {
        writeln!(self.output, "{}", message).ok();
    }
}

/// Answers from a fixed list; runs out instead of blocking
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    /// Everything asked or said, in order
    pub transcript: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        self.transcript.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| PromptError::Exhausted(question.trim().to_string()))
    }

    fn say(&mut self, message: &str) {
        self.transcript.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_strips_line_ending() {
        let mut out = Vec::new();
        let mut prompter = ConsolePrompter::new(&b"Palermo\r\nSI\n"[..], &mut out);

        assert_eq!(prompter.ask("Barrio: ").unwrap(), "Palermo");
        assert_eq!(prompter.ask("Destacada: ").unwrap(), "SI");
        assert!(matches!(prompter.ask("Otra: "), Err(PromptError::Closed(_))));
        drop(prompter);

        assert!(String::from_utf8(out).unwrap().starts_with("Barrio: "));
    }

    #[test]
    fn test_scripted_runs_out() {
        let mut prompter = ScriptedPrompter::new(["uno"]);
        assert_eq!(prompter.ask("? ").unwrap(), "uno");
        assert!(matches!(prompter.ask("? "), Err(PromptError::Exhausted(_))));
        assert_eq!(prompter.transcript.len(), 2);
    }
}
