use std::io::{self, BufRead, Write};

use anyhow::{Context, Error};

/// Source of interactive operator input. The selection algorithms take this
/// as a parameter so they can be driven by a scripted source in tests.
pub trait Prompter {
    /// Prints the prompt and reads one line of input, trimmed. End of input
    /// is reported as an empty line.
    fn read_line(&mut self, prompt: &str) -> Result<String, Error>;

    /// Asks a yes/no question until one of the answers is given.
    fn confirm(&mut self, question: &str) -> Result<bool, Error> {
        loop {
            let answer = self.read_line(&format!("{question} (Y/N): "))?;
            match answer.to_lowercase().as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => continue,
            }
        }
    }
}

/// Prompter reading from standard input.
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, Error> {
        print!("{prompt}");
        io::stdout().flush().context("Failed to flush stdout")?;
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        Ok(line.trim().to_string())
    }
}

/// Presents a numbered 1-based menu selection of `count` items and returns
/// the chosen zero-based index, or None when the operator exits with an
/// empty line. Out-of-range and non-numeric input re-prompts.
pub fn choose_index(
    prompter: &mut dyn Prompter,
    count: usize,
) -> Result<Option<usize>, Error> {
    loop {
        let answer =
            prompter.read_line(&format!("Enter selection (1-{count} or empty to exit): "))?;
        if answer.is_empty() {
            return Ok(None);
        }
        match answer.parse::<usize>() {
            Ok(value) if (1..=count).contains(&value) => return Ok(Some(value - 1)),
            _ => continue,
        }
    }
}
