//! Checkout pipeline for Libris.
//!
//! Every checkout request passes through the desk before anything changes.
//! The desk runs a fail-fast pipeline of stages (catalog, request, book,
//! availability, patron, hold) against the merged catalog and records a
//! trail of per-stage results. Only an approved request is applied: the
//! book is marked unavailable, the ISBN is appended to the user's held
//! books, and both tables are rewritten.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use libris_catalog::{BookRepository, CheckoutRepository, UserRepository};
//! use libris_checkout::{CheckoutDesk, CheckoutRequest};
//! use libris_store::{InMemoryTableStore, TableStore};
//!
//! let store: Arc<dyn TableStore> = Arc::new(InMemoryTableStore::new());
//! let mut books = BookRepository::new(store.clone());
//! let mut users = UserRepository::new(store);
//! let mut log = CheckoutRepository::new();
//! books.add("Dune", "Frank Herbert", "978-0-441-17271-7").unwrap();
//! users.add("Alice", "1").unwrap();
//!
//! let desk = CheckoutDesk::with_default_stages();
//! let request = CheckoutRequest::new("1", "978-0-441-17271-7");
//! let receipt = desk.checkout(&request, &mut books, &mut users, &mut log).unwrap();
//! assert!(!receipt.book.is_available());
//! ```

pub mod desk;
pub mod error;
pub mod stage;
pub mod stages;

pub use desk::{CheckoutDesk, CheckoutReceipt, Evaluation};
pub use error::{CheckoutError, CheckoutResult, Entity, Missing, Rejection};
pub use stage::{CheckoutContext, CheckoutRequest, CheckoutStage, StageDecision, StageResult};
pub use stages::{AvailabilityStage, BookStage, CatalogStage, HoldStage, PatronStage, RequestStage};
