//! Core CLI dispatch and shell context helpers.

use std::path::PathBuf;

use strsim::levenshtein;
use thiserror::Error;

use crate::{
    config::{ConfigError, ConfigManager},
    entry::{
        CommandResolver, EntryWizard, FormatError, LineAction, RecordState, WizardOutcome,
    },
    errors::LedgerError,
    storage::{JsonLedger, Ledger},
    utils::paths::PathResolver,
};

use super::help;
use super::interaction::ShellInteraction;
use super::io::Terminal;
use super::output;
use super::registry::CommandRegistry;
use super::shell::parse_command_line;
pub use crate::cli::shell_context::{CliMode, ShellContext};
pub use crate::errors::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error("Could not access the book: {0}")]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Schema(#[from] FormatError),
    #[error(transparent)]
    Cli(#[from] CliError),
    #[error("exit requested")]
    ExitRequested,
}

impl ShellContext {
    /// Context rooted at `$TRADEBOOK_HOME` (or `~/.tradebook`).
    pub fn new(
        mode: CliMode,
        registry: CommandRegistry,
        terminal: Box<dyn Terminal>,
    ) -> Result<Self, CliError> {
        Self::with_base_dir(mode, registry, terminal, PathResolver::base_dir())
    }

    pub fn with_base_dir(
        mode: CliMode,
        registry: CommandRegistry,
        terminal: Box<dyn Terminal>,
        base_dir: PathBuf,
    ) -> Result<Self, CliError> {
        let config_manager = ConfigManager::with_base_dir(base_dir.clone())?;
        let config = config_manager.load()?;
        let ledger = JsonLedger::open(&base_dir, &config.book_name)?;
        Self::with_parts(
            mode,
            registry,
            terminal,
            Box::new(ledger),
            config_manager,
            base_dir,
        )
    }

    /// Assembles a context around an existing ledger; configuration is loaded
    /// from `config_manager`.
    pub fn with_parts(
        mode: CliMode,
        registry: CommandRegistry,
        terminal: Box<dyn Terminal>,
        ledger: Box<dyn Ledger>,
        config_manager: ConfigManager,
        base_dir: PathBuf,
    ) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        output::set_preferences(output::OutputPreferences {
            color_enabled: config.color_enabled,
        });
        let menu = registry.menu();
        tracing::debug!(commands = ?menu.words(), "shell context ready");
        Ok(ShellContext {
            mode,
            registry,
            menu,
            terminal,
            ledger,
            config_manager,
            config,
            base_dir,
            last_command: None,
            running: true,
        })
    }

    pub(crate) fn resolver(&self) -> CommandResolver {
        CommandResolver::new(self.menu.clone())
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        match self.mode {
            CliMode::Interactive => format!("tradebook[{}]> ", self.config.book_name),
            CliMode::Script => String::new(),
        }
    }

    /// Resolves one shell line and runs whatever it asks for.
    pub(crate) fn handle_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err);
                return Ok(LoopControl::Continue);
            }
        };
        self.last_command = Some(line.trim().to_string());

        let resolution = self.resolver().resolve(&tokens, None);
        if let Some(conflict) = resolution.conflict() {
            output::warning(conflict);
        }

        match resolution.action {
            LineAction::Help { topic } => {
                help::print_help(&self.registry, topic.as_deref());
                Ok(LoopControl::Continue)
            }
            LineAction::Run { command } => {
                let args: Vec<&str> = resolution.tokens.iter().map(String::as_str).collect();
                self.dispatch(&command, &args)
            }
            LineAction::Fields | LineAction::Unknown => {
                if let Some(first) = resolution.tokens.first() {
                    self.suggest_command(first);
                }
                Ok(LoopControl::Continue)
            }
            LineAction::Empty => Ok(LoopControl::Continue),
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            tracing::debug!(command, ?args, "dispatching");
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => {
                    self.running = false;
                    Ok(LoopControl::Exit)
                }
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(command);
            Ok(LoopControl::Continue)
        }
    }

    /// Runs `command` after a wizard was left in its favour, with the other
    /// tokens of the line that asked for it.
    pub(crate) fn follow_redirect(&mut self, command: &str, args: &[String]) -> CommandResult {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match self.dispatch(command, &args)? {
            LoopControl::Continue => Ok(()),
            LoopControl::Exit => Err(CommandError::ExitRequested),
        }
    }

    /// Runs an entry wizard named after `command` on `record`, seeded with the
    /// arguments the command was invoked with.
    pub(crate) fn run_wizard(
        &mut self,
        command: &str,
        record: RecordState,
        args: &[&str],
    ) -> WizardOutcome {
        let seed: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        let wizard = EntryWizard::new(command, self.menu.clone(), record);
        let mut interaction = ShellInteraction::new(self, command);
        wizard.run(&mut interaction, &seed)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 2 {
                output::hint(format!("Did you mean `{}`?", best));
            }
        }
    }

    /// Asks a yes/no question; a failing terminal counts as "no".
    pub(crate) fn confirm(&mut self, question: &str) -> bool {
        match self.terminal.confirm(question) {
            Ok(answer) => answer,
            Err(err) => {
                tracing::warn!(error = %err, "confirmation failed");
                false
            }
        }
    }

    pub(crate) fn confirm_exit(&mut self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        self.terminal.confirm("Exit shell?")
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Ledger(err) => {
                tracing::warn!(error = %err, "ledger operation failed");
                output::error(format!("Could not access the book: {}", err));
                Ok(())
            }
            other => {
                output::error(other);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::cli::commands;
    use crate::cli::io::ScriptTerminal;
    use crate::storage::MemoryLedger;
    use tempfile::TempDir;

    /// Script-mode context over an in-memory ledger and a temporary home.
    pub(crate) fn script_context(script: &str) -> (ShellContext, TempDir) {
        let home = tempfile::tempdir().expect("temp dir");
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);
        let config_manager =
            ConfigManager::with_base_dir(home.path().to_path_buf()).expect("config manager");
        let context = ShellContext::with_parts(
            CliMode::Script,
            registry,
            Box::new(ScriptTerminal::from_script(script)),
            Box::new(MemoryLedger::new()),
            config_manager,
            home.path().to_path_buf(),
        )
        .expect("context");
        (context, home)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::script_context;
    use super::*;

    #[test]
    fn exit_stops_the_shell() {
        let (mut context, _home) = script_context("");
        let control = context.handle_line("exit").unwrap();
        assert_eq!(control, LoopControl::Exit);
        assert!(!context.running);
    }

    #[test]
    fn command_found_anywhere_in_the_line() {
        let (mut context, _home) = script_context("y\n");
        let control = context
            .handle_line("long stop:95 open add price:100 atr:1.5%")
            .unwrap();
        assert_eq!(control, LoopControl::Continue);

        let row = context.ledger.read("trades").unwrap().expect("row written");
        assert_eq!(
            &row[2..],
            ["open", "long", "100.00000000", "95.00000000", "0.0150"]
        );
        assert_eq!(
            context.last_command.as_deref(),
            Some("long stop:95 open add price:100 atr:1.5%")
        );
    }

    #[test]
    fn unknown_lines_and_help_keep_the_shell_running() {
        let (mut context, _home) = script_context("");
        for line in ["chek", "help", "help add", "\"unterminated", "   "] {
            assert_eq!(context.handle_line(line).unwrap(), LoopControl::Continue);
        }
        assert!(context.ledger.read("trades").unwrap().is_none());
    }

    #[test]
    fn wizard_redirect_carries_the_rest_of_the_line() {
        let (mut context, _home) = script_context("./set off swing\ny\nrisk:1%\n");
        let control = context.handle_line("add long").unwrap();
        assert_eq!(control, LoopControl::Continue);

        assert!(!context.config.color_enabled);
        assert_eq!(context.config.book_name, "swing");
        assert_eq!(context.config.default_risk.as_deref(), Some("0.0100"));
    }

    #[test]
    fn wizard_redirect_runs_the_other_command() {
        let (mut context, _home) = script_context("exit\ny\n");
        let control = context.handle_line("add long").unwrap();
        assert_eq!(control, LoopControl::Exit);
        assert!(!context.running);
    }
}
