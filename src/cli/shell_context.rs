//! Shared runtime state for CLI interactions and command execution.

use std::path::PathBuf;

use crate::{
    config::{Config, ConfigManager},
    entry::CommandMenu,
    storage::Ledger,
};

use super::{io::Terminal, registry::CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    /// Reserved words derived from `registry` when the shell starts.
    pub menu: CommandMenu,
    pub terminal: Box<dyn Terminal>,
    pub ledger: Box<dyn Ledger>,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub base_dir: PathBuf,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn status(&self) -> String {
        format!(
            "ShellContext {{ running: {}, book: {}, last_command: {:?} }}",
            self.running, self.config.book_name, self.last_command
        )
    }
}
