//! notely-core - Core library for Notely
//!
//! This crate contains the document tree the delete handler observes, the
//! selector matcher used to find containers and controls, and the models
//! describing a note reference and the outcome of a deletion request.
//! It performs no I/O.

pub mod dom;
pub mod error;
pub mod models;
pub mod selector;

pub use dom::{ClickEvent, Document, NodeId};
pub use error::{Error, Result};
pub use models::{DeletionOutcome, FailureKind, NoteRef};
pub use selector::{Selector, SelectorError};
