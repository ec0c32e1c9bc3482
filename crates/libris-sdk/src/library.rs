use std::collections::HashSet;
use std::sync::Arc;

use libris_catalog::{
    BookRepository, CheckoutRepository, ListMode, Record, Repository, UserRepository,
};
use libris_checkout::{CheckoutDesk, CheckoutReceipt, CheckoutRequest};
use libris_store::{CsvTableStore, Row, TableStore};
use libris_types::{Book, Checkout, User};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::LibraryConfig;
use crate::error::SdkResult;

/// Rows appended by a save, per table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    pub books: usize,
    pub users: usize,
}

/// Counts describing the current state of a library.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LibraryStatus {
    pub books: usize,
    pub books_available: usize,
    pub users: usize,
    pub unsaved_books: usize,
    pub unsaved_users: usize,
    pub checkouts: usize,
}

/// High-level Libris API.
///
/// Owns the store handle, the three repositories, and the checkout desk.
/// Build one per process and pass it by reference.
pub struct Library {
    config: LibraryConfig,
    store: Arc<dyn TableStore>,
    books: BookRepository,
    users: UserRepository,
    checkouts: CheckoutRepository,
    desk: CheckoutDesk,
}

impl Library {
    /// Open the CSV tables under `config.storage_dir`, creating the
    /// directory if needed.
    pub fn open(config: LibraryConfig) -> SdkResult<Self> {
        let store = CsvTableStore::open(&config.storage_dir)?;
        info!(dir = %config.storage_dir.display(), "library opened");
        Ok(Self::with_store(Arc::new(store), config))
    }

    /// Use an existing store, e.g. an in-memory one.
    pub fn with_store(store: Arc<dyn TableStore>, config: LibraryConfig) -> Self {
        Self {
            books: BookRepository::new(store.clone()),
            users: UserRepository::new(store.clone()),
            checkouts: CheckoutRepository::new(),
            desk: CheckoutDesk::with_default_stages(),
            store,
            config,
        }
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    // ---- Books ----

    /// Validate and add a book. Saved immediately when autosave is on.
    pub fn add_book(&mut self, title: &str, author: &str, isbn: &str) -> SdkResult<Book> {
        let book = self.books.add(title, author, isbn)?.clone();
        if self.config.autosave {
            self.books.save_all()?;
        }
        Ok(book)
    }

    /// Books in the configured listing mode.
    pub fn list_books(&self) -> SdkResult<Vec<Book>> {
        self.list_books_with(self.config.listing_mode())
    }

    pub fn list_books_with(&self, mode: ListMode) -> SdkResult<Vec<Book>> {
        Ok(self.books.list(mode)?)
    }

    // ---- Users ----

    /// Validate and register a user. Saved immediately when autosave is on.
    pub fn add_user(&mut self, name: &str, id: &str) -> SdkResult<User> {
        let user = self.users.add(name, id)?.clone();
        if self.config.autosave {
            self.users.save_all()?;
        }
        Ok(user)
    }

    /// Users in the configured listing mode.
    pub fn list_users(&self) -> SdkResult<Vec<User>> {
        self.list_users_with(self.config.listing_mode())
    }

    pub fn list_users_with(&self, mode: ListMode) -> SdkResult<Vec<User>> {
        Ok(self.users.list(mode)?)
    }

    // ---- Checkout ----

    /// Lend the book `isbn` to the user `user_id`.
    pub fn checkout(&mut self, user_id: &str, isbn: &str) -> SdkResult<CheckoutReceipt> {
        let request = CheckoutRequest::new(user_id, isbn);
        let receipt = self.desk.checkout(
            &request,
            &mut self.books,
            &mut self.users,
            &mut self.checkouts,
        )?;
        Ok(receipt)
    }

    /// Checkouts made through this library, oldest first.
    pub fn checkouts(&self) -> &[Checkout] {
        self.checkouts.list()
    }

    // ---- State ----

    /// Merge-save in-memory books and users. Records already stored are
    /// skipped.
    pub fn save(&self) -> SdkResult<SaveSummary> {
        let books: Vec<Row> = self.books.in_memory().iter().map(Record::to_row).collect();
        let users: Vec<Row> = self.users.in_memory().iter().map(Record::to_row).collect();
        let (books, users) = self.store.save_system_state(&books, &users)?;
        debug!(books, users, "saved library state");
        Ok(SaveSummary { books, users })
    }

    /// Drop everything held in memory. Later queries see only what storage
    /// holds, as a fresh process would. The checkout log is kept.
    pub fn reload(&mut self) {
        self.books.clear_memory();
        self.users.clear_memory();
        debug!("in-memory records dropped");
    }

    /// Counts over the deduplicated catalog.
    pub fn status(&self) -> SdkResult<LibraryStatus> {
        let books = self.books.list(ListMode::Deduplicated)?;
        let users = self.users.list(ListMode::Deduplicated)?;
        Ok(LibraryStatus {
            books: books.len(),
            books_available: books.iter().filter(|b| b.is_available()).count(),
            users: users.len(),
            unsaved_books: self.unsaved(&self.books)?,
            unsaved_users: self.unsaved(&self.users)?,
            checkouts: self.checkouts.len(),
        })
    }

    fn unsaved<R: Record>(&self, repo: &Repository<R>) -> SdkResult<usize> {
        let table = R::TABLE;
        let stored: HashSet<String> = self
            .store
            .load(table)?
            .iter()
            .filter_map(|row| row.get(table.key_column()))
            .map(|key| table.normalize_key(key))
            .collect();
        Ok(repo
            .in_memory()
            .iter()
            .filter(|r| !stored.contains(&r.normalized_key()))
            .count())
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("config", &self.config)
            .field("books", &self.books)
            .field("users", &self.users)
            .field("checkouts", &self.checkouts.len())
            .finish()
    }
}
