//! Foundation types for Libris.
//!
//! This crate provides the record types tracked by the catalog and the
//! validation rules that guard their construction. Every other Libris crate
//! depends on `libris-types`.
//!
//! # Key Types
//!
//! - [`Book`]: A catalogued title, keyed by ISBN
//! - [`User`]: A registered patron, keyed by [`UserId`]
//! - [`Checkout`]: A single issuance of a book to a user
//! - [`Availability`]: Whether a book is on the shelf
//! - [`ErrorKind`]: Classification shared by every error in the workspace

pub mod book;
pub mod checkout;
pub mod error;
pub mod isbn;
pub mod temporal;
pub mod user;

pub use book::{Availability, Book};
pub use checkout::Checkout;
pub use error::{ErrorKind, RecordError};
pub use isbn::{is_valid_isbn, validate_isbn, ISBN_EXAMPLE};
pub use temporal::{format_timestamp, now, parse_timestamp, TIMESTAMP_FORMAT};
pub use user::{join_holds, parse_holds, User, UserId};
