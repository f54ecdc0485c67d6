//! Line input and confirmations for both shell modes.

use std::io::{self, BufRead};

use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::cli::output;
use crate::errors::CliError;

/// Result of reading one line from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C in interactive mode.
    Interrupted,
    Eof,
}

/// Source of input lines and yes/no answers.
pub trait Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, CliError>;

    fn confirm(&mut self, question: &str) -> Result<bool, CliError>;

    fn add_history(&mut self, _line: &str) {}
}

/// Reads one line per call from a buffered source, typically stdin.
///
/// Prompts are echoed so transcripts stay readable, and confirmations consume
/// the next line: `y` or `yes` accepts, anything else declines.
pub struct ScriptTerminal {
    lines: io::Lines<Box<dyn BufRead>>,
}

impl ScriptTerminal {
    pub fn new(reader: Box<dyn BufRead>) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    pub fn stdin() -> Self {
        Self::new(Box::new(io::BufReader::new(io::stdin())))
    }

    #[cfg(test)]
    pub fn from_script(script: &str) -> Self {
        Self::new(Box::new(io::Cursor::new(script.to_string())))
    }

    fn next_line(&mut self) -> Result<Option<String>, CliError> {
        match self.lines.next() {
            Some(line) => Ok(Some(line?)),
            None => Ok(None),
        }
    }
}

impl Terminal for ScriptTerminal {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, CliError> {
        if !prompt.is_empty() {
            output::prompt(prompt.trim_end());
        }
        Ok(match self.next_line()? {
            Some(line) => ReadOutcome::Line(line),
            None => ReadOutcome::Eof,
        })
    }

    fn confirm(&mut self, question: &str) -> Result<bool, CliError> {
        output::prompt(format!("{} [y/N]", question));
        let answer = self.next_line()?.unwrap_or_default();
        Ok(is_affirmative(&answer))
    }
}

pub(crate) fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Yes/no question on the controlling terminal, defaulting to no.
pub fn confirm_action(theme: &ColorfulTheme, question: &str) -> Result<bool, CliError> {
    Confirm::with_theme(theme)
        .with_prompt(question)
        .default(false)
        .interact()
        .map_err(CliError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_confirmations_consume_a_line() {
        let mut terminal = ScriptTerminal::from_script("yes\nnope\nadd\n");
        assert!(terminal.confirm("Log it?").unwrap());
        assert!(!terminal.confirm("Log it?").unwrap());
        assert_eq!(
            terminal.read_line("").unwrap(),
            ReadOutcome::Line("add".into())
        );
        assert_eq!(terminal.read_line("").unwrap(), ReadOutcome::Eof);
        assert!(!terminal.confirm("Log it?").unwrap());
    }

    #[test]
    fn affirmative_answers() {
        for answer in ["y", "Y", " yes ", "YES"] {
            assert!(is_affirmative(answer));
        }
        for answer in ["", "n", "no", "yep"] {
            assert!(!is_affirmative(answer));
        }
    }
}
