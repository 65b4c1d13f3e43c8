//! Note reference model

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a rendered note, as carried by its delete control.
///
/// The token is never validated client-side; the deletion endpoint decides
/// whether it names a note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteRef(String);

impl NoteRef {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Build a reference from a raw attribute value.
    ///
    /// Returns `None` when the value is absent or blank, since such a control
    /// cannot address any note.
    #[must_use]
    pub fn from_attribute(value: Option<&str>) -> Option<Self> {
        let value = value?;
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}
