//! Command resolution for a single input line.
//!
//! A line may mix a help request, one command and field tokens. Resolution
//! order is fixed: help markers are removed first, then a forced `./word`
//! (scanning from the end), then the first bare command word. Any further
//! command word in the same line is dropped.

use crate::errors::EntryIssue;

pub const HELP_WORD: &str = "help";
pub const FORCED_PREFIX: &str = "./";
pub const NAVIGATION_WORDS: [&str; 2] = ["cancel", "back"];

/// The reserved command words of one shell session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandMenu {
    words: Vec<String>,
}

impl CommandMenu {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut menu = Self::default();
        for word in words {
            let word = word.as_ref().trim().to_lowercase();
            if !word.is_empty() && !menu.words.contains(&word) {
                menu.words.push(word);
            }
        }
        menu
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(word))
    }

    /// True for help markers, bare command words and `./` forced command words.
    pub fn is_command_token(&self, token: &str) -> bool {
        is_help_marker(token) || self.contains(token) || self.forced_word(token).is_some()
    }

    fn forced_word(&self, token: &str) -> Option<String> {
        token
            .strip_prefix(FORCED_PREFIX)
            .filter(|word| !word.eq_ignore_ascii_case(HELP_WORD) && self.contains(word))
            .map(str::to_lowercase)
    }
}

pub fn is_navigation(command: &str) -> bool {
    NAVIGATION_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(command))
}

fn is_help_marker(token: &str) -> bool {
    token.eq_ignore_ascii_case(HELP_WORD)
        || token
            .strip_prefix(FORCED_PREFIX)
            .is_some_and(|word| word.eq_ignore_ascii_case(HELP_WORD))
}

/// What the caller should do with a resolved line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    /// Show help, for `topic` when a command word accompanied the request.
    Help { topic: Option<String> },
    /// Run the resolved command.
    Run { command: String },
    /// No command: the remaining tokens are field values for the active wizard.
    Fields,
    /// No command and no active wizard to take the tokens.
    Unknown,
    /// Nothing left to act on.
    Empty,
}

/// Outcome of resolving one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub action: LineAction,
    /// Tokens left after command and help extraction.
    pub tokens: Vec<String>,
    /// Extra command words dropped because another command already won.
    pub dropped: Vec<String>,
}

impl Resolution {
    pub fn help_requested(&self) -> bool {
        matches!(self.action, LineAction::Help { .. })
    }

    /// The command word found in the line, whether it runs or is a help topic.
    pub fn command(&self) -> Option<&str> {
        match &self.action {
            LineAction::Run { command } => Some(command),
            LineAction::Help { topic } => topic.as_deref(),
            _ => None,
        }
    }

    pub fn conflict(&self) -> Option<EntryIssue> {
        match (self.command(), self.dropped.is_empty()) {
            (Some(kept), false) => Some(EntryIssue::CommandConflict {
                kept: kept.to_string(),
                dropped: self.dropped.clone(),
            }),
            _ => None,
        }
    }
}

/// Splits a line into at most one command, a help flag and field tokens.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    menu: CommandMenu,
}

impl CommandResolver {
    pub fn new(menu: CommandMenu) -> Self {
        Self { menu }
    }

    pub fn menu(&self) -> &CommandMenu {
        &self.menu
    }

    /// Resolves `tokens`; `active` names the wizard currently collecting fields.
    pub fn resolve<S: AsRef<str>>(&self, tokens: &[S], active: Option<&str>) -> Resolution {
        let mut help_requested = false;
        let mut remaining: Vec<String> = Vec::with_capacity(tokens.len());
        for token in tokens.iter().map(AsRef::as_ref) {
            if is_help_marker(token) {
                help_requested = true;
            } else if !token.trim().is_empty() {
                remaining.push(token.to_string());
            }
        }

        let command = match remaining
            .iter()
            .rposition(|token| self.menu.forced_word(token).is_some())
        {
            Some(index) => {
                let token = remaining.remove(index);
                self.menu.forced_word(&token)
            }
            None => remaining
                .iter()
                .position(|token| self.menu.contains(token))
                .map(|index| remaining.remove(index).to_lowercase()),
        };

        let mut dropped = Vec::new();
        let mut plain = Vec::with_capacity(remaining.len());
        for token in remaining {
            if self.menu.is_command_token(&token) {
                dropped.push(token);
            } else if let Some(rest) = token.strip_prefix(FORCED_PREFIX) {
                if !rest.is_empty() {
                    plain.push(rest.to_string());
                }
            } else {
                plain.push(token);
            }
        }

        if !dropped.is_empty() {
            tracing::warn!(
                command = ?command,
                dropped = ?dropped,
                "multiple commands in one line"
            );
        }

        let action = match (help_requested, command) {
            (true, topic) => LineAction::Help { topic },
            (false, Some(command)) => LineAction::Run { command },
            (false, None) if plain.is_empty() => LineAction::Empty,
            (false, None) if active.is_some() => LineAction::Fields,
            (false, None) => LineAction::Unknown,
        };
        tracing::debug!(?action, tokens = ?plain, "resolved line");

        Resolution {
            action,
            tokens: plain,
            dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(words: &[&str]) -> CommandResolver {
        CommandResolver::new(CommandMenu::new(words.iter().copied()))
    }

    #[test]
    fn first_bare_command_wins_a_conflict() {
        let resolution = resolver(&["entry", "check"]).resolve(&["entry", "open", "check"], None);
        assert_eq!(
            resolution.action,
            LineAction::Run {
                command: "entry".into()
            }
        );
        assert_eq!(resolution.tokens, vec!["open"]);
        assert_eq!(resolution.dropped, vec!["check"]);
        assert_eq!(
            resolution.conflict(),
            Some(EntryIssue::CommandConflict {
                kept: "entry".into(),
                dropped: vec!["check".into()],
            })
        );
    }

    #[test]
    fn forced_prefix_overrides_bare_words() {
        let resolver = resolver(&["entry", "check"]);
        let resolution = resolver.resolve(&["short", "./entry", "open"], None);
        assert_eq!(resolution.command(), Some("entry"));
        assert_eq!(resolution.tokens, vec!["short", "open"]);
        assert!(resolution.dropped.is_empty());

        let resolution = resolver.resolve(&["check", "./entry"], None);
        assert_eq!(resolution.command(), Some("entry"));
        assert_eq!(resolution.dropped, vec!["check"]);
    }

    #[test]
    fn last_forced_command_is_taken() {
        let resolution = resolver(&["add", "check"]).resolve(&["./add", "./check"], None);
        assert_eq!(resolution.command(), Some("check"));
        assert_eq!(resolution.dropped, vec!["./add"]);
    }

    #[test]
    fn unknown_forced_word_becomes_plain_token() {
        let resolution = resolver(&["add"]).resolve(&["./long", "add"], None);
        assert_eq!(resolution.command(), Some("add"));
        assert_eq!(resolution.tokens, vec!["long"]);
    }

    #[test]
    fn help_turns_command_into_topic() {
        let resolver = resolver(&["add", "check"]);
        let resolution = resolver.resolve(&["help", "add"], None);
        assert_eq!(
            resolution.action,
            LineAction::Help {
                topic: Some("add".into())
            }
        );
        assert!(resolution.help_requested());

        let resolution = resolver.resolve(&["./help"], None);
        assert_eq!(resolution.action, LineAction::Help { topic: None });
    }

    #[test]
    fn plain_tokens_need_an_active_wizard() {
        let resolver = resolver(&["add"]);
        assert_eq!(
            resolver.resolve(&["long", "open"], None).action,
            LineAction::Unknown
        );
        let resolution = resolver.resolve(&["long", "open"], Some("add"));
        assert_eq!(resolution.action, LineAction::Fields);
        assert_eq!(resolution.tokens, vec!["long", "open"]);
        assert_eq!(
            resolver.resolve(&[] as &[&str], Some("add")).action,
            LineAction::Empty
        );
    }

    #[test]
    fn command_words_match_case_insensitively() {
        let resolution = resolver(&["check"]).resolve(&["CHECK"], None);
        assert_eq!(resolution.command(), Some("check"));
        assert!(is_navigation("Cancel"));
        assert!(!is_navigation("check"));
    }
}
