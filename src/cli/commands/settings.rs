use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, section as output_section, OutputPreferences};
use crate::cli::registry::CommandEntry;
use crate::domain::settings::{self, settings_record, SETTINGS_SCHEMA};
use crate::entry::{RecordState, WizardOutcome};
use crate::storage::JsonLedger;

const COMMAND: &str = "set";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        COMMAND,
        "Change settings",
        "set [on|off] [risk:N%] [book name]",
        cmd_set,
    )
    .with_fields(&SETTINGS_SCHEMA)]
}

fn cmd_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    output_section("Current settings");
    for token in settings::current_tokens(&context.config) {
        output::detail(token);
    }

    let record = settings_record()?;
    match context.run_wizard(COMMAND, record, args) {
        WizardOutcome::Complete(record) => save_settings(context, &record),
        WizardOutcome::BulkMode(_) | WizardOutcome::Cancelled => {
            output::info("Settings unchanged.");
            Ok(())
        }
        WizardOutcome::Redirected { command, args } => {
            context.follow_redirect(&command, &args)
        }
    }
}

fn save_settings(context: &mut ShellContext, record: &RecordState) -> CommandResult {
    let mut config = context.config.clone();
    let changed = settings::apply(record, &mut config).map_err(CommandError::InvalidArguments)?;
    if changed.is_empty() {
        output::info("Settings unchanged.");
        return Ok(());
    }

    context.config_manager.save(&config)?;
    if changed.contains(&"book") {
        context.ledger = Box::new(JsonLedger::open(&context.base_dir, &config.book_name)?);
        tracing::info!(book = %config.book_name, "switched book");
    }
    output::set_preferences(OutputPreferences {
        color_enabled: config.color_enabled,
    });
    context.config = config;

    output::success(format!("Saved {}.", changed.join(", ")));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::core::test_support::script_context;
    use crate::config::ConfigManager;

    #[test]
    fn settings_are_saved_and_the_book_switches() {
        let (mut context, home) = script_context("risk:0.5%\n");
        context.handle_line("set swing off").unwrap();

        assert_eq!(context.config.book_name, "swing");
        assert!(!context.config.color_enabled);
        assert_eq!(context.config.default_risk.as_deref(), Some("0.0050"));

        let saved = ConfigManager::with_base_dir(home.path().to_path_buf())
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(saved, context.config);
        assert!(home.path().join("books").join("swing").is_dir());
    }

    #[test]
    fn cancelling_keeps_the_configuration() {
        let (mut context, home) = script_context("cancel\ny\n");
        context.handle_line("set scalps").unwrap();

        assert_eq!(context.config.book_name, "trading_book");
        assert!(!home.path().join("config.json").exists());
    }
}
