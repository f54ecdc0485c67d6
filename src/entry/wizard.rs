//! Line-driven wizard that fills a [`RecordState`] until it is complete,
//! cancelled, or switched to bulk mode.

use crate::entry::assign::{FieldAssigner, FieldSlot, RecordState, BULK_SENTINEL};
use crate::entry::command::{is_navigation, CommandMenu, CommandResolver, LineAction};
use crate::errors::EntryIssue;

/// Lifecycle states of a wizard run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    CollectingFields,
    AwaitingOverwriteConfirmation,
    BulkMode,
    Cancelled,
    Complete,
}

/// Terminal result handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    /// Every slot is filled.
    Complete(RecordState),
    /// The bulk sentinel was entered; carries the record as it stood.
    BulkMode(RecordState),
    /// The user confirmed leaving the wizard. Nothing is kept.
    Cancelled,
    /// The user confirmed leaving the wizard to run another command; `args`
    /// are the other tokens of that line.
    Redirected { command: String, args: Vec<String> },
}

/// One line read for the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineInput {
    Line(String),
    Eof,
}

/// Data provided to render the prompt for the next empty field.
pub struct PromptContext<'a> {
    pub wizard: &'a str,
    pub record: &'a RecordState,
    pub field: &'a FieldSlot,
    pub filled: usize,
    pub total: usize,
}

/// Interaction surface used by the wizard. The shell provides a terminal
/// implementation; tests script it.
pub trait EntryInteraction {
    fn prompt_line(&mut self, context: &PromptContext<'_>) -> LineInput;

    /// Yes/no question. `state` is the wizard state the answer resolves,
    /// `AwaitingOverwriteConfirmation` for replacing a filled field.
    fn confirm(&mut self, question: &str, state: WizardState) -> bool;

    fn notify(&mut self, issue: &EntryIssue);

    /// Show help for `topic`, or for the fields of `record` when no topic was named.
    fn show_help(&mut self, topic: Option<&str>, record: &RecordState);
}

pub struct EntryWizard {
    name: String,
    resolver: CommandResolver,
    assigner: FieldAssigner,
    record: RecordState,
    state: WizardState,
}

impl EntryWizard {
    /// `name` is the command that started the wizard; `record` fixes its fields.
    pub fn new(name: impl Into<String>, menu: CommandMenu, record: RecordState) -> Self {
        Self {
            name: name.into().to_lowercase(),
            resolver: CommandResolver::new(menu.clone()),
            assigner: FieldAssigner::new(menu),
            record,
            state: WizardState::CollectingFields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn record(&self) -> &RecordState {
        &self.record
    }

    /// Runs to a terminal outcome. `seed` holds tokens given with the command
    /// itself and is applied before the first prompt.
    pub fn run<I: EntryInteraction>(
        mut self,
        interaction: &mut I,
        seed: &[String],
    ) -> WizardOutcome {
        if !seed.is_empty() {
            if let Some(outcome) = self.process_line(interaction, seed) {
                return outcome;
            }
        }

        loop {
            if self.record.is_complete() {
                self.state = WizardState::Complete;
                return WizardOutcome::Complete(self.record);
            }

            let input = match self.record.next_empty() {
                Some(field) => {
                    let context = PromptContext {
                        wizard: &self.name,
                        record: &self.record,
                        field,
                        filled: self.record.filled_count(),
                        total: self.record.len(),
                    };
                    interaction.prompt_line(&context)
                }
                None => continue,
            };

            let line = match input {
                LineInput::Line(line) => line,
                LineInput::Eof => {
                    tracing::warn!(
                        wizard = %self.name,
                        "input closed before the record was complete"
                    );
                    self.state = WizardState::Cancelled;
                    return WizardOutcome::Cancelled;
                }
            };
            let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            if let Some(outcome) = self.process_line(interaction, &tokens) {
                return outcome;
            }
        }
    }

    /// Applies one line of tokens. Returns an outcome when the line ends the wizard.
    pub fn process_line<I: EntryInteraction, S: AsRef<str>>(
        &mut self,
        interaction: &mut I,
        tokens: &[S],
    ) -> Option<WizardOutcome> {
        let resolution = self.resolver.resolve(tokens, Some(self.name.as_str()));
        if let Some(conflict) = resolution.conflict() {
            interaction.notify(&conflict);
        }

        match &resolution.action {
            LineAction::Help { topic } => interaction.show_help(topic.as_deref(), &self.record),
            LineAction::Run { command } if *command == self.name => {
                interaction.notify(&EntryIssue::AlreadyRunning(command.clone()));
            }
            LineAction::Run { command } => {
                return self.leave(interaction, command, &resolution.tokens)
            }
            LineAction::Fields | LineAction::Unknown | LineAction::Empty => {}
        }

        if resolution.tokens.is_empty() {
            return None;
        }

        let assignment = self.assigner.assign(&self.record, &resolution.tokens);
        if assignment.bulk_mode_triggered {
            let ignored: Vec<String> = resolution
                .tokens
                .iter()
                .filter(|token| !is_bulk_token(token))
                .cloned()
                .collect();
            if !ignored.is_empty() {
                interaction.notify(&EntryIssue::IgnoredForBulk(ignored));
            }
            self.state = WizardState::BulkMode;
            return Some(WizardOutcome::BulkMode(self.record.clone()));
        }
        for issue in &assignment.issues {
            interaction.notify(issue);
        }
        self.record = assignment.state;

        if !assignment.pending.is_empty() {
            self.state = WizardState::AwaitingOverwriteConfirmation;
            for edit in assignment.pending {
                let question = format!(
                    "Replace {key}:{current} with {key}:{proposed}?",
                    key = edit.key,
                    current = edit.current,
                    proposed = edit.proposed
                );
                if interaction.confirm(&question, self.state) {
                    self.record.set(&edit.key, &edit.proposed);
                } else {
                    interaction.notify(&EntryIssue::OverwriteDeclined {
                        key: edit.key,
                        kept: edit.current,
                        proposed: edit.proposed,
                    });
                }
            }
            self.state = WizardState::CollectingFields;
        }
        None
    }

    fn leave<I: EntryInteraction>(
        &mut self,
        interaction: &mut I,
        command: &str,
        args: &[String],
    ) -> Option<WizardOutcome> {
        let question = if is_navigation(command) {
            format!("Leave `{}`? Entered fields will be discarded.", self.name)
        } else {
            format!(
                "Leave `{}` and run `{}`? Entered fields will be discarded.",
                self.name, command
            )
        };
        if !interaction.confirm(&question, self.state) {
            return None;
        }

        tracing::info!(wizard = %self.name, command, "wizard abandoned");
        self.state = WizardState::Cancelled;
        self.record = RecordState::new();
        if is_navigation(command) {
            Some(WizardOutcome::Cancelled)
        } else {
            Some(WizardOutcome::Redirected {
                command: command.to_string(),
                args: args.to_vec(),
            })
        }
    }
}

/// The bulk sentinel, bare or as `key:bulk`.
fn is_bulk_token(token: &str) -> bool {
    let value = token.rsplit(':').next().unwrap_or(token);
    value.eq_ignore_ascii_case(BULK_SENTINEL)
}
