use crate::config::Config;
use crate::entry::{FormatError, RecordState};
use crate::utils::paths::canonical_name;

/// Field keys and formats of the settings wizard. Enumerations come before
/// free text so bare words land on `color` before `book`.
pub const SETTINGS_SCHEMA: [(&str, &str); 3] = [
    ("color", "on/off"),
    ("risk", "#.####%"),
    ("book", "any"),
];

pub fn settings_record() -> Result<RecordState, FormatError> {
    RecordState::from_schema(&SETTINGS_SCHEMA)
}

/// Current configuration rendered as `key:value` tokens, in schema order.
pub fn current_tokens(config: &Config) -> Vec<String> {
    vec![
        format!("color:{}", if config.color_enabled { "on" } else { "off" }),
        format!(
            "risk:{}",
            config.default_risk.as_deref().unwrap_or("unset")
        ),
        format!("book:{}", config.book_name),
    ]
}

/// Copies the values of a completed settings record into `config`.
///
/// Returns the keys whose value changed. Fails when the book name has no
/// usable characters.
pub fn apply(record: &RecordState, config: &mut Config) -> Result<Vec<&'static str>, String> {
    let mut changed = Vec::new();

    if let Some(book) = record.value("book") {
        if canonical_name(book).is_empty() {
            return Err(format!("`{book}` cannot be used as a book name"));
        }
        if config.book_name != book {
            config.book_name = book.to_string();
            changed.push("book");
        }
    }
    if let Some(risk) = record.value("risk") {
        if config.default_risk.as_deref() != Some(risk) {
            config.default_risk = Some(risk.to_string());
            changed.push("risk");
        }
    }
    if let Some(color) = record.value("color") {
        let enabled = color == "on";
        if config.color_enabled != enabled {
            config.color_enabled = enabled;
            changed.push("color");
        }
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{CommandMenu, FieldAssigner};

    #[test]
    fn bare_words_prefer_color_over_book() {
        let assigner = FieldAssigner::new(CommandMenu::new(["set", "add"]));
        let record = settings_record().unwrap();
        let assignment = assigner.assign(&record, &["swing", "off", "1%"]);

        assert!(assignment.issues.is_empty());
        assert_eq!(assignment.state.value("color"), Some("off"));
        assert_eq!(assignment.state.value("risk"), Some("0.0100"));
        assert_eq!(assignment.state.value("book"), Some("swing"));
    }

    #[test]
    fn apply_reports_changed_keys() {
        let mut record = settings_record().unwrap();
        record.set("color", "on");
        record.set("risk", "0.0200");
        record.set("book", "scalps");

        let mut config = Config::default();
        let changed = apply(&record, &mut config).unwrap();
        assert_eq!(changed, vec!["book", "risk"]);
        assert_eq!(config.book_name, "scalps");
        assert_eq!(config.default_risk.as_deref(), Some("0.0200"));
        assert_eq!(
            current_tokens(&config),
            vec!["color:on", "risk:0.0200", "book:scalps"]
        );
    }

    #[test]
    fn unusable_book_names_are_rejected() {
        let mut record = settings_record().unwrap();
        record.set("book", "%%");
        assert!(apply(&record, &mut Config::default()).is_err());
    }
}
