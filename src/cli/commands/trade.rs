use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::io::ReadOutcome;
use crate::cli::output::{self, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::domain::trade::{trade_record, Trade, TRADE_SCHEMA};
use crate::entry::command::is_navigation;
use crate::entry::{FieldAssigner, LineAction, RecordState, WizardOutcome};
use crate::errors::EntryIssue;

const COMMAND: &str = "add";
const BULK_PROMPT: &str = "bulk> ";
const BULK_DONE: &str = "done";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        COMMAND,
        "Log a trade",
        "add [open|close|update|bulk] [long|short] [price:N] [stop:N] [atr:N%]",
        cmd_add,
    )
    .with_fields(&TRADE_SCHEMA)]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let record = trade_record()?;
    match context.run_wizard(COMMAND, record, args) {
        WizardOutcome::Complete(record) => log_trade(context, &record),
        WizardOutcome::BulkMode(template) => run_bulk(context, template),
        WizardOutcome::Cancelled => {
            output::info("Trade discarded.");
            Ok(())
        }
        WizardOutcome::Redirected { command, args } => {
            context.follow_redirect(&command, &args)
        }
    }
}

fn log_trade(context: &mut ShellContext, record: &RecordState) -> CommandResult {
    let trade = Trade::from_record(record)
        .ok_or_else(|| CommandError::Message("The trade is missing fields.".into()))?;

    output_section("Trade");
    for line in trade.summary_lines() {
        output::detail(line);
    }
    if !context.confirm("Log this trade?") {
        output::info("Trade discarded.");
        return Ok(());
    }

    write_trade(context, &trade)?;
    output::success(format!("Trade logged to `{}`.", context.config.trades_table));
    Ok(())
}

fn write_trade(context: &mut ShellContext, trade: &Trade) -> CommandResult {
    let table = context.config.trades_table.clone();
    context.ledger.write(&table, &trade.to_row())?;
    tracing::info!(table = %table, id = %trade.id, action = %trade.action, "trade logged");
    Ok(())
}

/// Reads one trade per line until an empty line, `done`, or end of input.
///
/// Fields entered before `bulk` apply to every line.
fn run_bulk(context: &mut ShellContext, template: RecordState) -> CommandResult {
    output::info("Bulk mode: one trade per line. Enter an empty line or `done` to finish.");
    if template.filled_count() > 0 {
        output::info(format!("Every line starts from: {}", template));
    }

    let resolver = context.resolver();
    let assigner = FieldAssigner::new(context.menu.clone());
    let mut line_number = 0usize;
    let mut logged = 0usize;
    let mut skipped = 0usize;

    loop {
        let line = match context.terminal.read_line(BULK_PROMPT)? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Interrupted | ReadOutcome::Eof => break,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(BULK_DONE) {
            break;
        }
        line_number += 1;

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let resolution = resolver.resolve(&tokens, Some(COMMAND));
        if let Some(conflict) = resolution.conflict() {
            output::warning(conflict);
        }
        match &resolution.action {
            LineAction::Help { topic } => {
                match topic.as_deref().and_then(|name| context.registry.get(name)) {
                    Some(entry) => help::print_command(entry),
                    None => help::print_fields(COMMAND, &template),
                }
            }
            LineAction::Run { command } if is_navigation(command) => break,
            LineAction::Run { command } => {
                output::warning(format!(
                    "`{}` cannot run in bulk mode; finish with `{}` first.",
                    command, BULK_DONE
                ));
                skipped += 1;
                continue;
            }
            LineAction::Fields | LineAction::Unknown | LineAction::Empty => {}
        }
        if resolution.tokens.is_empty() {
            continue;
        }

        let assignment = assigner.assign(&template, &resolution.tokens);
        if assignment.bulk_mode_triggered {
            output::warning("Already in bulk mode.");
            skipped += 1;
            continue;
        }
        for issue in &assignment.issues {
            output::warning(format!("line {}: {}", line_number, issue));
        }

        let mut record = assignment.state;
        for edit in assignment.pending {
            let question = format!(
                "Replace {key}:{current} with {key}:{proposed}?",
                key = edit.key,
                current = edit.current,
                proposed = edit.proposed
            );
            if context.confirm(&question) {
                record.set(&edit.key, &edit.proposed);
            } else {
                output::warning(EntryIssue::OverwriteDeclined {
                    key: edit.key,
                    kept: edit.current,
                    proposed: edit.proposed,
                });
            }
        }

        match Trade::from_record(&record) {
            Some(trade) => {
                write_trade(context, &trade)?;
                logged += 1;
            }
            None => {
                let missing: Vec<&str> = record
                    .slots()
                    .iter()
                    .filter(|slot| !slot.is_filled())
                    .map(|slot| slot.key())
                    .collect();
                output::warning(format!(
                    "line {} skipped, missing {}",
                    line_number,
                    missing.join(", ")
                ));
                skipped += 1;
            }
        }
    }

    tracing::info!(logged, skipped, "bulk mode finished");
    output::success(format!(
        "Bulk mode finished: {} logged, {} skipped.",
        logged, skipped
    ));
    Ok(())
}
