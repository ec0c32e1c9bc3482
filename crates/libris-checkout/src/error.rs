use std::fmt;

use libris_catalog::CatalogError;
use libris_store::StoreError;
use libris_types::{ErrorKind, RecordError};

/// Which side of the catalog is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Missing {
    Books,
    Users,
    Both,
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Books => "books",
            Self::Users => "users",
            Self::Both => "books and users",
        })
    }
}

/// The kind of record a lookup failed to find.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    Book,
    User,
}

impl Entity {
    fn key_label(self) -> &'static str {
        match self {
            Self::Book => "ISBN",
            Self::User => "user ID",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Book => "book",
            Self::User => "user",
        })
    }
}

/// Why a stage refused a checkout request.
///
/// Every rejection is raised before anything is changed, so the caller can
/// correct the input and try again.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("no {0} registered; add some before checking out")]
    EmptyCatalog(Missing),

    #[error(transparent)]
    IncompleteRecord(RecordError),

    #[error("{entity} with {} {key:?} not found", .entity.key_label())]
    NotFound { entity: Entity, key: String },

    #[error("book {isbn:?} is already checked out")]
    AlreadyCheckedOut { isbn: String },

    #[error("user {user_id:?} already holds book {isbn:?}")]
    DuplicateHold { user_id: String, isbn: String },
}

impl Rejection {
    /// The taxonomy entry for this rejection.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyCatalog(_) => ErrorKind::EmptyCatalog,
            Self::IncompleteRecord(e) => e.kind(),
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyCheckedOut { .. } => ErrorKind::AlreadyCheckedOut,
            Self::DuplicateHold { .. } => ErrorKind::DuplicateHold,
        }
    }
}

/// Errors that can occur during a checkout.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// A stage refused the request.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// Loading the merged catalog failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Writing the updated tables failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A stage misbehaved, e.g. ran before the stage it depends on.
    #[error("stage error in '{stage}': {message}")]
    Stage { stage: String, message: String },
}

impl CheckoutError {
    /// Create a stage error with a name and message.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// The taxonomy entry for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Rejected(r) => r.kind(),
            Self::Catalog(e) => e.kind(),
            Self::Store(e) => e.kind(),
            Self::Stage { .. } => ErrorKind::Storage,
        }
    }

    /// The rejection, if a stage refused the request.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

/// Convenience type alias for checkout operations.
pub type CheckoutResult<T> = std::result::Result<T, CheckoutError>;
