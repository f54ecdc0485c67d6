//! Record slots and the token-to-field assignment passes.

use std::fmt;

use crate::entry::command::CommandMenu;
use crate::entry::format::{FormatError, FormatSpec};
use crate::errors::EntryIssue;

/// Literal that switches a wizard into bulk mode when a slot lists it.
pub const BULK_SENTINEL: &str = "bulk";
const KEY_SEPARATOR: char = ':';

/// One named, typed value of a record.
///
/// A set value is stored as `key:value`, which is also the token form a user
/// can type to edit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSlot {
    key: String,
    spec: FormatSpec,
    value: Option<String>,
}

impl FieldSlot {
    pub fn new(key: impl Into<String>, spec: FormatSpec) -> Self {
        Self {
            key: key.into().to_lowercase(),
            spec,
            value: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn spec(&self) -> &FormatSpec {
        &self.spec
    }

    pub fn is_filled(&self) -> bool {
        self.value.is_some()
    }

    /// The stored `key:value` token.
    pub fn token(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The normalized value without its key prefix.
    pub fn value(&self) -> Option<&str> {
        self.value
            .as_deref()
            .and_then(|token| token.split_once(KEY_SEPARATOR))
            .map(|(_, value)| value)
    }

    fn set(&mut self, normalized: &str) {
        self.value = Some(format!("{}{}{}", self.key, KEY_SEPARATOR, normalized));
    }
}

/// Ordered set of field slots being filled by a wizard.
///
/// Order decides both the prompting sequence and which slot wins when a token
/// fits several.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordState {
    slots: Vec<FieldSlot>,
}

impl RecordState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an empty record from `(key, format)` pairs.
    pub fn from_schema(schema: &[(&str, &str)]) -> Result<Self, FormatError> {
        let mut record = Self::new();
        for (key, format) in schema {
            record.push(FieldSlot::new(*key, format.parse()?))?;
        }
        Ok(record)
    }

    pub fn push(&mut self, slot: FieldSlot) -> Result<(), FormatError> {
        if self.slot(slot.key()).is_some() {
            return Err(FormatError::DuplicateField(slot.key().to_string()));
        }
        self.slots.push(slot);
        Ok(())
    }

    pub fn slots(&self) -> &[FieldSlot] {
        &self.slots
    }

    pub fn slot(&self, key: &str) -> Option<&FieldSlot> {
        self.slots
            .iter()
            .find(|slot| slot.key.eq_ignore_ascii_case(key))
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut FieldSlot> {
        self.slots
            .iter_mut()
            .find(|slot| slot.key.eq_ignore_ascii_case(key))
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.slot(key).and_then(FieldSlot::value)
    }

    /// Stores an already-normalized value. Returns false for unknown keys.
    pub fn set(&mut self, key: &str, normalized: &str) -> bool {
        match self.slot_mut(key) {
            Some(slot) => {
                slot.set(normalized);
                true
            }
            None => false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(FieldSlot::is_filled)
    }

    pub fn next_empty(&self) -> Option<&FieldSlot> {
        self.slots.iter().find(|slot| !slot.is_filled())
    }

    pub fn empty_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_filled()).count()
    }

    pub fn filled_count(&self) -> usize {
        self.slots.len() - self.empty_count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `key:value` tokens of the filled slots, in record order.
    pub fn filled_tokens(&self) -> Vec<&str> {
        self.slots.iter().filter_map(FieldSlot::token).collect()
    }

    /// Normalized values in record order; `None` until every slot is filled.
    pub fn values(&self) -> Option<Vec<String>> {
        self.slots
            .iter()
            .map(|slot| slot.value().map(str::to_string))
            .collect()
    }

    fn empty_slot_accepting(
        &self,
        token: &str,
        eligible: impl Fn(&FormatSpec) -> bool,
    ) -> Option<(String, String)> {
        self.slots
            .iter()
            .filter(|slot| !slot.is_filled() && eligible(&slot.spec))
            .find_map(|slot| {
                slot.spec
                    .validate(token)
                    .ok()
                    .map(|normalized| (slot.key.clone(), normalized))
            })
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filled_tokens().join(" "))
    }
}

/// An explicit `key:value` edit of a slot that already holds a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOverwrite {
    pub key: String,
    pub current: String,
    pub proposed: String,
}

/// Result of running the assignment passes over one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub state: RecordState,
    pub issues: Vec<EntryIssue>,
    pub pending: Vec<PendingOverwrite>,
    pub bulk_mode_triggered: bool,
}

impl Assignment {
    fn unchanged(state: &RecordState) -> Self {
        Self {
            state: state.clone(),
            issues: Vec::new(),
            pending: Vec::new(),
            bulk_mode_triggered: false,
        }
    }

    /// Tokens that ended up in no slot.
    pub fn unplaced(&self) -> Vec<&str> {
        self.issues.iter().flat_map(EntryIssue::tokens).collect()
    }
}

/// Places field tokens into the slots of a record.
///
/// Three passes run in order, each consuming what it places:
/// forced `key:value` tokens, then `%` tokens against percentage fields, then
/// remaining tokens against enumeration and free-text fields. Numeric fields
/// are never filled by trial.
#[derive(Debug, Clone)]
pub struct FieldAssigner {
    menu: CommandMenu,
}

impl FieldAssigner {
    pub fn new(menu: CommandMenu) -> Self {
        Self { menu }
    }

    pub fn assign<S: AsRef<str>>(&self, state: &RecordState, tokens: &[S]) -> Assignment {
        let mut assignment = Assignment::unchanged(state);
        let mut remaining = Vec::with_capacity(tokens.len());
        for token in tokens.iter().map(|token| token.as_ref().trim()) {
            if token.is_empty() {
                continue;
            }
            if self.menu.is_command_token(token) {
                assignment
                    .issues
                    .push(EntryIssue::CommandWord(token.to_string()));
            } else {
                remaining.push(token.to_string());
            }
        }

        if requests_bulk(state, &remaining) {
            tracing::debug!("bulk sentinel found");
            assignment.bulk_mode_triggered = true;
            return assignment;
        }

        let (forced, mut plain): (Vec<String>, Vec<String>) = remaining
            .into_iter()
            .partition(|token| token.contains(KEY_SEPARATOR));
        for token in forced {
            assign_forced(&mut assignment, &token);
        }

        let open = assignment.state.empty_count();
        if plain.len() > open {
            let excess = plain.split_off(open);
            assignment.issues.push(EntryIssue::TooManyArguments(excess));
        }

        let (percentages, free): (Vec<String>, Vec<String>) =
            plain.into_iter().partition(|token| token.ends_with('%'));
        for token in percentages {
            assign_by_trial(&mut assignment, token, FormatSpec::allows_percentage);
        }
        for token in free {
            assign_by_trial(&mut assignment, token, FormatSpec::auto_assignable);
        }

        tracing::debug!(
            record = %assignment.state,
            pending = assignment.pending.len(),
            issues = assignment.issues.len(),
            "assigned tokens"
        );
        assignment
    }
}

fn requests_bulk(state: &RecordState, tokens: &[String]) -> bool {
    tokens.iter().any(|token| match token.split_once(KEY_SEPARATOR) {
        Some((key, value)) => {
            value.eq_ignore_ascii_case(BULK_SENTINEL)
                && state
                    .slot(key)
                    .is_some_and(|slot| slot.spec.lists(BULK_SENTINEL))
        }
        None => {
            token.eq_ignore_ascii_case(BULK_SENTINEL)
                && state
                    .slots
                    .iter()
                    .any(|slot| !slot.is_filled() && slot.spec.lists(BULK_SENTINEL))
        }
    })
}

fn assign_forced(assignment: &mut Assignment, token: &str) {
    let Some((key, raw)) = token.split_once(KEY_SEPARATOR) else {
        return;
    };
    let Some(slot) = assignment.state.slot(key) else {
        assignment.issues.push(EntryIssue::UnknownField {
            token: token.to_string(),
            key: key.to_string(),
        });
        return;
    };

    let normalized = match slot.spec.validate(raw) {
        Ok(normalized) => normalized,
        Err(_) => {
            assignment.issues.push(EntryIssue::InvalidFormat {
                token: token.to_string(),
                key: slot.key.clone(),
                expected: slot.spec.describe(),
            });
            return;
        }
    };

    match slot.value() {
        None => {
            let key = slot.key.clone();
            assignment.state.set(&key, &normalized);
        }
        Some(current) if current == normalized => {}
        Some(current) => assignment.pending.push(PendingOverwrite {
            key: slot.key.clone(),
            current: current.to_string(),
            proposed: normalized,
        }),
    }
}

fn assign_by_trial(assignment: &mut Assignment, token: String, eligible: fn(&FormatSpec) -> bool) {
    match assignment.state.empty_slot_accepting(&token, eligible) {
        Some((key, normalized)) => {
            assignment.state.set(&key, &normalized);
        }
        None => assignment.issues.push(EntryIssue::UnknownToken(token)),
    }
}
