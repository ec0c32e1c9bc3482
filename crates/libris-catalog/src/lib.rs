//! Repositories for the Libris catalog.
//!
//! A repository owns the records created during one process run and
//! consults the table store for everything persisted by earlier runs.
//! Queries see the union of both; nothing loaded from disk is kept between
//! calls.
//!
//! # Modules
//!
//! - [`error`]: Error types for repository operations
//! - [`record`]: The [`Record`] trait mapping entities to stored rows
//! - [`repository`]: The generic [`Repository`] and [`ListMode`]
//! - [`books`]: [`BookRepository`]
//! - [`users`]: [`UserRepository`]
//! - [`checkouts`]: [`CheckoutRepository`], the checkout event log

pub mod books;
pub mod checkouts;
pub mod error;
pub mod record;
pub mod repository;
pub mod users;

pub use books::BookRepository;
pub use checkouts::CheckoutRepository;
pub use error::{CatalogError, CatalogResult};
pub use record::Record;
pub use repository::{ListMode, Repository};
pub use users::UserRepository;
