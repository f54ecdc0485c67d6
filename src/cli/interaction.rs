//! Terminal-backed [`EntryInteraction`] used by the shell's wizards.

use crate::entry::{EntryInteraction, LineInput, PromptContext, RecordState, WizardState};
use crate::errors::EntryIssue;

use super::core::ShellContext;
use super::help;
use super::io::ReadOutcome;
use super::output;

pub struct ShellInteraction<'a> {
    context: &'a mut ShellContext,
    wizard: String,
}

impl<'a> ShellInteraction<'a> {
    pub fn new(context: &'a mut ShellContext, wizard: &str) -> Self {
        Self {
            context,
            wizard: wizard.to_string(),
        }
    }
}

pub(crate) fn field_prompt(context: &PromptContext<'_>) -> String {
    format!(
        "{} [{}/{}] {} ({})> ",
        context.wizard,
        context.filled + 1,
        context.total,
        context.field.key(),
        context.field.spec().describe()
    )
}

impl EntryInteraction for ShellInteraction<'_> {
    fn prompt_line(&mut self, context: &PromptContext<'_>) -> LineInput {
        if context.filled > 0 {
            output::detail(context.record);
        }
        match self.context.terminal.read_line(&field_prompt(context)) {
            Ok(ReadOutcome::Line(line)) => {
                if !line.trim().is_empty() {
                    self.context.terminal.add_history(line.trim());
                }
                LineInput::Line(line)
            }
            // Ctrl-C asks to leave the wizard like `cancel` does.
            Ok(ReadOutcome::Interrupted) => LineInput::Line("cancel".to_string()),
            Ok(ReadOutcome::Eof) => LineInput::Eof,
            Err(err) => {
                tracing::warn!(error = %err, "reading wizard input failed");
                LineInput::Eof
            }
        }
    }

    fn confirm(&mut self, question: &str, state: WizardState) -> bool {
        tracing::debug!(?state, wizard = %self.wizard, "asking for confirmation");
        self.context.confirm(question)
    }

    fn notify(&mut self, issue: &EntryIssue) {
        output::warning(issue);
    }

    fn show_help(&mut self, topic: Option<&str>, record: &RecordState) {
        match topic.and_then(|name| self.context.registry.get(name)) {
            Some(entry) => help::print_command(entry),
            None => help::print_fields(&self.wizard, record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{FieldSlot, FormatSpec};

    #[test]
    fn prompt_names_field_and_progress() {
        let record = RecordState::new();
        let field = FieldSlot::new(
            "price",
            FormatSpec::Numeric {
                decimal_places: 2,
                allows_percentage: false,
            },
        );
        let context = PromptContext {
            wizard: "add",
            record: &record,
            field: &field,
            filled: 2,
            total: 5,
        };
        assert_eq!(
            field_prompt(&context),
            "add [3/5] price (a number with 2 decimals (e.g. 1.50))> "
        );
    }
}
