//! Delimited-text table storage for Libris.
//!
//! The catalog persists two tables, books and users, each as a CSV file with
//! a header row. This crate owns those files; everything above it sees rows
//! as plain string maps.
//!
//! # Operations
//!
//! All backends implement the [`TableStore`] trait:
//!
//! - `load` -- read every row of a table (empty if the table does not exist)
//! - `save_merged` -- append only rows whose key is not yet stored
//! - `overwrite` -- replace a table's contents wholesale
//! - `exists` -- whether the table has been created
//!
//! # Backends
//!
//! - [`CsvTableStore`] -- one CSV file per table inside a directory
//! - [`InMemoryTableStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. `save_merged` never rewrites or reorders rows that are already stored.
//! 2. `overwrite` is the only way to change an existing row.
//! 3. Every read and write covers a whole file: open, read or write fully, close.
//! 4. All I/O errors are propagated, never silently ignored.
//! 5. One process per storage directory; nothing here locks files.

pub mod csv_store;
pub mod error;
pub mod memory;
pub mod merge;
pub mod table;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use csv_store::CsvTableStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryTableStore;
pub use table::{columns, Row, Table};
pub use traits::TableStore;
