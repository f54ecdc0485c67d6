use std::collections::VecDeque;

use tradebook::domain::trade_record;
use tradebook::entry::{
    CommandMenu, CommandResolver, EntryInteraction, EntryWizard, FieldAssigner, FormatSpec,
    LineAction, LineInput, PromptContext, RecordState, WizardOutcome, WizardState,
};
use tradebook::errors::EntryIssue;

fn menu() -> CommandMenu {
    CommandMenu::new(["add", "set", "check", "exit", "help", "cancel", "back"])
}

#[test]
fn validation_normalizes_notation() {
    let money: FormatSpec = "#.##".parse().unwrap();
    assert_eq!(money.validate("1,5").unwrap(), "1.50");
    assert_eq!(money.validate(".5").unwrap(), "0.50");
    assert!(money.validate("abc").is_err());

    let percent: FormatSpec = "#.##%".parse().unwrap();
    assert_eq!(percent.validate("10%").unwrap(), "0.10");
    assert!(!"any".parse::<FormatSpec>().unwrap().allows_percentage());
}

#[test]
fn resolver_prefers_forced_commands() {
    let resolver = CommandResolver::new(menu());
    let resolution = resolver.resolve(&["short", "./check", "open", "add"], None);
    assert_eq!(
        resolution.action,
        LineAction::Run {
            command: "check".into()
        }
    );
    assert_eq!(resolution.tokens, vec!["short", "open"]);
    assert_eq!(resolution.dropped, vec!["add"]);

    let help = resolver.resolve(&["check", "help"], Some("add"));
    assert_eq!(
        help.action,
        LineAction::Help {
            topic: Some("check".into())
        }
    );
}

#[test]
fn assigner_routes_tokens_by_precedence() {
    let assigner = FieldAssigner::new(menu());
    let record = trade_record().unwrap();
    let assignment = assigner.assign(&record, &["short", "action:open", "150.25", "2%"]);

    assert_eq!(assignment.state.value("action"), Some("open"));
    assert_eq!(assignment.state.value("type"), Some("short"));
    assert_eq!(assignment.state.value("atr"), Some("0.0200"));
    assert_eq!(assignment.state.value("price"), None);
    assert_eq!(
        assignment.issues,
        vec![EntryIssue::UnknownToken("150.25".into())]
    );

    let again = assigner.assign(&assignment.state, &[] as &[&str]);
    assert_eq!(again.state, assignment.state);
}

struct Scripted {
    lines: VecDeque<&'static str>,
    prompts: Vec<String>,
}

impl EntryInteraction for Scripted {
    fn prompt_line(&mut self, context: &PromptContext<'_>) -> LineInput {
        self.prompts.push(context.field.key().to_string());
        self.lines
            .pop_front()
            .map(|line| LineInput::Line(line.to_string()))
            .unwrap_or(LineInput::Eof)
    }

    fn confirm(&mut self, _question: &str, _state: WizardState) -> bool {
        true
    }

    fn notify(&mut self, _issue: &EntryIssue) {}

    fn show_help(&mut self, _topic: Option<&str>, _record: &RecordState) {}
}

#[test]
fn wizard_prompts_in_field_order() {
    let mut interaction = Scripted {
        lines: VecDeque::from(vec!["stop:99 price:101", "atr:0.5%"]),
        prompts: Vec::new(),
    };
    let wizard = EntryWizard::new("add", menu(), trade_record().unwrap());
    let seed = vec!["long".to_string(), "close".to_string()];

    match wizard.run(&mut interaction, &seed) {
        WizardOutcome::Complete(record) => {
            assert_eq!(
                record.filled_tokens(),
                vec![
                    "action:close",
                    "type:long",
                    "price:101.00000000",
                    "stop:99.00000000",
                    "atr:0.0050"
                ]
            );
        }
        other => panic!("Unexpected outcome: {:?}", other),
    }
    assert_eq!(interaction.prompts, vec!["price", "atr"]);
}
