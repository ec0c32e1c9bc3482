use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification shared by every error in the workspace.
///
/// Each crate keeps its own error enum; `kind()` on any of them maps onto
/// this taxonomy so callers can decide how to react without matching on
/// crate-specific variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A required field was empty after trimming.
    IncompleteRecord,
    /// A field did not match its expected format (e.g. the ISBN pattern).
    InvalidFormat,
    /// An ISBN or user ID collides with an existing record.
    DuplicateKey,
    /// Checkout was attempted with no books or no users registered.
    EmptyCatalog,
    /// A referenced book or user does not exist.
    NotFound,
    /// The requested book is not on the shelf.
    AlreadyCheckedOut,
    /// The user already holds this book.
    DuplicateHold,
    /// The storage backend failed (disk full, permission denied, ...).
    Storage,
}

impl ErrorKind {
    /// Returns `true` if the caller can retry with corrected input.
    ///
    /// Only storage failures are unrecoverable.
    pub fn is_recoverable(self) -> bool {
        !matches!(self, Self::Storage)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IncompleteRecord => "incomplete record",
            Self::InvalidFormat => "invalid format",
            Self::DuplicateKey => "duplicate key",
            Self::EmptyCatalog => "empty catalog",
            Self::NotFound => "not found",
            Self::AlreadyCheckedOut => "already checked out",
            Self::DuplicateHold => "duplicate hold",
            Self::Storage => "storage failure",
        };
        f.write_str(name)
    }
}

/// Errors produced while constructing or decoding records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A required field is empty after trimming.
    #[error("{record} information is incomplete: {field} must not be empty")]
    IncompleteRecord {
        record: &'static str,
        field: &'static str,
    },

    /// A field does not match its expected format.
    #[error("invalid {field} {value:?} (example of a valid {field}: {example})")]
    InvalidFormat {
        field: &'static str,
        value: String,
        example: &'static str,
    },
}

impl RecordError {
    pub(crate) fn incomplete(record: &'static str, field: &'static str) -> Self {
        Self::IncompleteRecord { record, field }
    }

    /// The taxonomy entry for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IncompleteRecord { .. } => ErrorKind::IncompleteRecord,
            Self::InvalidFormat { .. } => ErrorKind::InvalidFormat,
        }
    }

    /// A well-formed example value the caller can show alongside the error.
    pub fn example(&self) -> Option<&'static str> {
        match self {
            Self::InvalidFormat { example, .. } => Some(example),
            Self::IncompleteRecord { .. } => None,
        }
    }
}
