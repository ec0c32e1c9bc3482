use libris_types::ErrorKind;

/// Errors from table store operations.
///
/// Every variant is a storage failure: nothing here is caused by bad user
/// input, so none of them is recoverable by retrying with other values.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying file system.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader or writer failed (malformed quoting, I/O inside csv).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A table file exists but could not be atomically replaced.
    #[error("failed to replace {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An in-memory backend lock was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),
}

impl StoreError {
    /// The taxonomy entry for this error. Always [`ErrorKind::Storage`].
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Storage
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
