//! Error types for repository operations.

use libris_store::StoreError;
use libris_types::{ErrorKind, RecordError};
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The input failed record validation.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// A record with this key already exists in memory or in storage.
    #[error("a {kind} with {field} {key:?} already exists")]
    DuplicateKey {
        kind: &'static str,
        field: &'static str,
        key: String,
    },

    /// The table store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl CatalogError {
    /// The taxonomy entry for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Record(e) => e.kind(),
            Self::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            Self::Store(e) => e.kind(),
        }
    }
}

/// Convenience type alias for repository operations.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
