use std::{borrow::Cow, fmt};

use dialoguer::theme::ColorfulTheme;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::cli::commands;
use crate::cli::core::{CliError, CliMode, LoopControl, ShellContext};
use crate::cli::io::{confirm_action, ReadOutcome, ScriptTerminal, Terminal};
use crate::cli::output;
use crate::cli::registry::CommandRegistry;

/// Set to run the shell over stdin, one command per line.
pub const SCRIPT_ENV: &str = "TRADEBOOK_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut registry = CommandRegistry::new();
    commands::register_all(&mut registry);

    let terminal: Box<dyn Terminal> = match mode {
        CliMode::Interactive => Box::new(InteractiveTerminal::new(registry.names().collect())?),
        CliMode::Script => Box::new(ScriptTerminal::stdin()),
    };

    let mut context = ShellContext::new(mode, registry, terminal)?;
    print_banner(&context);
    run_loop(&mut context)
}

fn print_banner(context: &ShellContext) {
    tracing::debug!(
        built_at = env!("TRADEBOOK_BUILD_TIMESTAMP"),
        profile = env!("TRADEBOOK_BUILD_PROFILE"),
        mode = ?context.mode,
        "starting shell"
    );
    output::section(format!(
        "Tradebook {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("TRADEBOOK_BUILD_HASH")
    ));
    output::info(format!(
        "Book `{}`. Type `add` to log a trade, `check` for the last one, `help` for more.",
        context.config.book_name
    ));
}

pub(crate) fn run_loop(context: &mut ShellContext) -> Result<(), CliError> {
    loop {
        if !context.running {
            break;
        }
        let prompt = context.prompt();

        match context.terminal.read_line(&prompt)? {
            ReadOutcome::Line(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                context.terminal.add_history(trimmed);

                match context.handle_line(trimmed) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err)?,
                }
            }
            ReadOutcome::Interrupted => {
                if context.confirm_exit()? {
                    break;
                }
            }
            ReadOutcome::Eof => {
                if context.mode == CliMode::Interactive {
                    output::info("Exiting shell.");
                }
                break;
            }
        }
    }

    tracing::debug!(status = %context.status(), "shell stopped");
    Ok(())
}

/// Line editor with command completion and history for interactive use.
pub struct InteractiveTerminal {
    editor: Editor<CommandHelper, DefaultHistory>,
    theme: ColorfulTheme,
}

impl InteractiveTerminal {
    pub fn new(commands: Vec<&'static str>) -> Result<Self, CliError> {
        let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(CommandHelper::new(commands)));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        Ok(Self {
            editor,
            theme: ColorfulTheme::default(),
        })
    }
}

impl Terminal for InteractiveTerminal {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, CliError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(err.into()),
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool, CliError> {
        confirm_action(&self.theme, question)
    }

    fn add_history(&mut self, line: &str) {
        self.editor.add_history_entry(line).ok();
    }
}

struct CommandHelper {
    commands: Vec<String>,
}

impl CommandHelper {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names
            .into_iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        commands.sort();
        commands.dedup();
        Self { commands }
    }

    fn candidates(&self, word: &str) -> Vec<Pair> {
        let (prefix, needle) = match word.strip_prefix("./") {
            Some(rest) => ("./", rest.to_ascii_lowercase()),
            None => ("", word.to_ascii_lowercase()),
        };
        self.commands
            .iter()
            .filter(|name| name.starts_with(&needle))
            .map(|name| Pair {
                display: name.clone(),
                replacement: format!("{}{}", prefix, name),
            })
            .collect()
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    /// Completes the word under the cursor. Commands may appear anywhere in a
    /// line, so every word is a candidate position.
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let word = &prefix[start..];
        if word.contains(':') {
            return Ok((start, Vec::new()));
        }
        Ok((start, self.candidates(word)))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let _ = ctx;
        Ok(ValidationResult::Valid(None))
    }
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not parse line: {}", self.message)
    }
}
