//src/prompt.rs
//! Line-based console interaction used by the interactive operations.
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Failures of the console channel itself. These are never recovered by re-prompting.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Input stream closed")]
    Closed,
    #[error("I/O error on console: {0}")]
    Io(#[from] io::Error),
}

/// Rejected user input. Callers report these and ask again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub trait Console {
    /// Shows `prompt` and blocks until one line is read. The line ending is stripped.
    fn ask(&mut self, prompt: &str) -> Result<String, PromptError>;

    /// Writes one line of output.
    fn say(&mut self, message: &str);
}

/// Console backed by the process stdin/stdout.
pub struct StdConsole {
    stdin: io::StdinLock<'static>,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin().lock(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn ask(&mut self, prompt: &str) -> Result<String, PromptError> {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        if self.stdin.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Console that replays canned answers and records everything it was shown.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
    pub output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            output: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    /// True if any output line contains `needle`.
    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }
}

impl Console for ScriptedConsole {
    fn ask(&mut self, prompt: &str) -> Result<String, PromptError> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or(PromptError::Closed)
    }

    fn say(&mut self, message: &str) {
        self.output.push(message.to_string());
    }
}

/// Asks until the answer is `y` or `n` (case-insensitive).
pub fn ask_yes_no(console: &mut dyn Console, prompt: &str) -> Result<bool, PromptError> {
    loop {
        match console.ask(prompt)?.trim().to_lowercase().as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => console.say("Please enter 'y' or 'n' only."),
        }
    }
}

/// Only a literal `y` counts as yes; anything else, including an empty line, is no.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Parses a numeric field, mapping parse failures to `InputError::InvalidFormat`.
pub fn parse_number<T: std::str::FromStr>(field: &str, input: &str) -> Result<T, InputError> {
    input
        .trim()
        .parse::<T>()
        .map_err(|_| InputError::InvalidFormat(format!("{field} must be a number, got '{}'", input.trim())))
}

/// Title-cases text: the first letter of every run of letters is upper-cased and the rest
/// of the run lower-cased. Non-letters break runs, so `"o'neil"` becomes `"O'Neil"`.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
