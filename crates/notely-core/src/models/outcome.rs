//! Deletion outcome model

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why the deletion endpoint refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 400: the endpoint could not parse the identifier
    InvalidId,
    /// 404: no note with that identifier
    NotFound,
    /// 5xx
    Server,
    /// Any other non-2xx status
    Other,
}

impl FailureKind {
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidId,
            404 => Self::NotFound,
            500..=599 => Self::Server,
            _ => Self::Other,
        }
    }

    pub const fn describe(self) -> &'static str {
        match self {
            Self::InvalidId => "invalid note ID format",
            Self::NotFound => "note not found",
            Self::Server => "server error",
            Self::Other => "unexpected status",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Result of a deletion request, decided purely by its HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeletionOutcome {
    Success,
    Failure { status: u16, kind: FailureKind },
}

impl DeletionOutcome {
    /// `2xx` is success, everything else is failure.
    pub const fn classify(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            _ => Self::Failure {
                status,
                kind: FailureKind::from_status(status),
            },
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}
