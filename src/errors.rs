use thiserror::Error;

/// Error type that captures ledger persistence failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid table name: `{0}`")]
    InvalidTable(String),
    #[error("Row for `{table}` has {actual} columns, expected {expected}")]
    RowShape {
        table: String,
        expected: usize,
        actual: usize,
    },
}

/// Failures that stop the shell itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Terminal error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("Prompt failed: {0}")]
    Dialoguer(#[from] dialoguer::Error),
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Invalid record schema: {0}")]
    Schema(#[from] crate::entry::FormatError),
}

/// Recoverable problems found while resolving a line of entry input.
///
/// None of these end a wizard; they are reported and the offending tokens are
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryIssue {
    #[error("`{token}` is not a valid {key}: expected {expected}")]
    InvalidFormat {
        token: String,
        key: String,
        expected: String,
    },
    #[error("Unknown field `{key}` in `{token}`")]
    UnknownField { token: String, key: String },
    #[error("Could not validate `{0}` against any open field")]
    UnknownToken(String),
    #[error(
        "Only one command runs per line: running `{kept}`, ignoring {}",
        .dropped.join(", ")
    )]
    CommandConflict { kept: String, dropped: Vec<String> },
    #[error("Too many values for the open fields, ignoring {}", .0.join(", "))]
    TooManyArguments(Vec<String>),
    #[error("Kept {key}:{kept}, discarded {key}:{proposed}")]
    OverwriteDeclined {
        key: String,
        kept: String,
        proposed: String,
    },
    #[error("`{0}` is a command and cannot be used as a value")]
    CommandWord(String),
    #[error("`{0}` is already in progress")]
    AlreadyRunning(String),
    #[error("Switching to bulk mode, ignoring {}", .0.join(", "))]
    IgnoredForBulk(Vec<String>),
}

impl EntryIssue {
    /// Token(s) the issue refers to, used when listing what could not be placed.
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            EntryIssue::InvalidFormat { token, .. } | EntryIssue::UnknownField { token, .. } => {
                vec![token.as_str()]
            }
            EntryIssue::UnknownToken(token) | EntryIssue::CommandWord(token) => {
                vec![token.as_str()]
            }
            EntryIssue::CommandConflict { dropped, .. } => {
                dropped.iter().map(String::as_str).collect()
            }
            EntryIssue::TooManyArguments(tokens) | EntryIssue::IgnoredForBulk(tokens) => {
                tokens.iter().map(String::as_str).collect()
            }
            EntryIssue::OverwriteDeclined { .. } | EntryIssue::AlreadyRunning(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_lists_dropped_tokens() {
        let issue = EntryIssue::CommandConflict {
            kept: "add".into(),
            dropped: vec!["check".into(), "./set".into()],
        };
        assert_eq!(
            issue.to_string(),
            "Only one command runs per line: running `add`, ignoring check, ./set"
        );
        assert_eq!(issue.tokens(), vec!["check", "./set"]);
    }
}
