use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::output::{self, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::domain::trade::Trade;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("check", "Show the last logged trade", "check", cmd_check),
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
        CommandEntry::new("cancel", "Leave the current entry", "cancel", cmd_cancel),
        CommandEntry::new("back", "Same as cancel", "back", cmd_cancel),
    ]
}

fn cmd_check(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if !args.is_empty() {
        output::warning(format!(
            "`check` takes no arguments, ignoring {}",
            args.join(" ")
        ));
    }

    let table = context.config.trades_table.clone();
    let Some(row) = context.ledger.read(&table)? else {
        output::info(format!(
            "No trades logged in `{}` yet.",
            context.config.book_name
        ));
        return Ok(());
    };

    let count = context.ledger.row_count(&table)?;
    output_section(format!("Last trade ({} logged)", count));
    match Trade::from_row(&row) {
        Some(trade) => {
            for line in trade.summary_lines() {
                output::detail(line);
            }
        }
        None => output::detail(row.join(" | ")),
    }
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(command) = args.first().map(|name| name.to_lowercase()) {
        if let Some(entry) = context.registry.get(&command) {
            help::print_command(entry);
        } else {
            context.suggest_command(args[0]);
        }
        return Ok(());
    }

    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}

fn cmd_cancel(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info("Nothing to cancel.");
    Ok(())
}
