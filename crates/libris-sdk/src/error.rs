use libris_catalog::CatalogError;
use libris_checkout::CheckoutError;
use libris_store::StoreError;
use libris_types::{ErrorKind, RecordError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SdkError {
    /// The taxonomy entry for this error. A bad configuration value counts
    /// as a format error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::InvalidFormat,
            Self::Catalog(e) => e.kind(),
            Self::Checkout(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }

    /// Returns `true` if the caller can retry with corrected input.
    pub fn is_recoverable(&self) -> bool {
        self.kind().is_recoverable()
    }

    /// A well-formed example value to show next to a format error.
    pub fn example(&self) -> Option<&'static str> {
        self.record_error().and_then(RecordError::example)
    }

    fn record_error(&self) -> Option<&RecordError> {
        match self {
            Self::Catalog(CatalogError::Record(e)) => Some(e),
            _ => None,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
