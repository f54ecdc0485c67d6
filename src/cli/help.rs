use crate::cli::output::{self, section as output_section};
use crate::cli::registry::{CommandEntry, CommandRegistry, FieldSchema};
use crate::entry::{FormatSpec, RecordState};

pub fn print_help(registry: &CommandRegistry, topic: Option<&str>) {
    match topic.and_then(|name| registry.get(name)) {
        Some(entry) => print_command(entry),
        None => print_overview(registry),
    }
}

pub fn print_overview(registry: &CommandRegistry) {
    output_section("Available commands");
    for entry in registry.list() {
        output::detail(format!("{:<8} {}", entry.name, entry.description));
    }
    output::info("Use `help <command>` for details.");
    output::info("Values can follow a command in any order; `key:value` sets a field directly.");
    output::info("Prefix a word with `./` to force it to run as a command.");
}

pub fn print_command(entry: &CommandEntry) {
    output_section(format!("Help: {}", entry.name));
    output::detail(format!("Description: {}", entry.description));
    output::detail(format!("Usage: {}", entry.usage));
    if let Some(fields) = entry.fields {
        print_schema(fields);
    }
}

fn print_schema(fields: FieldSchema) {
    output::detail("Fields:");
    for (key, format) in fields {
        let expected = format
            .parse::<FormatSpec>()
            .map(|spec| spec.describe())
            .unwrap_or_else(|_| format.to_string());
        output::detail(format!("  {:<8} {}", key, expected));
    }
}

/// Fields of a record in progress, with what is already filled.
pub fn print_fields(wizard: &str, record: &RecordState) {
    output_section(format!("Help: {}", wizard));
    for slot in record.slots() {
        let current = slot.value().unwrap_or("-");
        output::detail(format!(
            "{:<8} {:<14} {}",
            slot.key(),
            current,
            slot.spec().describe()
        ));
    }
    output::info("Type `cancel` to leave without saving.");
}
