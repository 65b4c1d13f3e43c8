//! Data models for Notely

mod note_ref;
mod outcome;

pub use note_ref::NoteRef;
pub use outcome::{DeletionOutcome, FailureKind};
