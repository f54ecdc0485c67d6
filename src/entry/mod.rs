//! Command and field disambiguation for free-form entry lines.
//!
//! [`CommandResolver`] pulls help markers and at most one command out of a
//! line, [`FieldAssigner`] places what is left into the slots of a
//! [`RecordState`], and [`EntryWizard`] drives both until the record is
//! complete.

pub mod assign;
pub mod command;
pub mod format;
pub mod wizard;

pub use assign::{Assignment, FieldAssigner, FieldSlot, PendingOverwrite, RecordState};
pub use command::{CommandMenu, CommandResolver, LineAction, Resolution};
pub use format::{FormatError, FormatSpec, ValidationError};
pub use wizard::{
    EntryInteraction, EntryWizard, LineInput, PromptContext, WizardOutcome, WizardState,
};
