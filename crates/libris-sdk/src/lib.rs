//! High-level SDK for Libris.
//!
//! [`Library`] is the single entry point for applications: it wires the
//! table store, the book and user repositories, the checkout log, and the
//! checkout desk together behind one handle. [`LibraryConfig`] decides
//! where the tables live and how listings behave.

pub mod config;
pub mod error;
pub mod library;

pub use config::{LibraryConfig, DEFAULT_CONFIG_FILE, DEFAULT_STORAGE_DIR};
pub use error::{SdkError, SdkResult};
pub use library::{Library, LibraryStatus, SaveSummary};

// Re-export key types
pub use libris_catalog::ListMode;
pub use libris_checkout::{CheckoutReceipt, Rejection, StageResult};
pub use libris_store::{CsvTableStore, InMemoryTableStore, TableStore};
pub use libris_types::{Availability, Book, Checkout, ErrorKind, User, UserId, ISBN_EXAMPLE};

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;

    const ISBN: &str = "978-0-123456-78-9";

    fn manual_save() -> LibraryConfig {
        LibraryConfig {
            autosave: false,
            ..LibraryConfig::default()
        }
    }

    fn in_memory(config: LibraryConfig) -> Library {
        Library::with_store(Arc::new(InMemoryTableStore::new()), config)
    }

    fn on_disk(dir: &Path, config: LibraryConfig) -> Library {
        Library::open(config.with_storage_dir(dir)).unwrap()
    }

    // ---- Test 1: Add a book once, then reject the duplicate ----

    #[test]
    fn add_book_then_duplicate() {
        let mut library = in_memory(LibraryConfig::default());
        let book = library.add_book("T", "A", ISBN).unwrap();
        assert_eq!(book.isbn(), ISBN);

        let err = library.add_book("T2", "B", ISBN).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
        assert!(err.is_recoverable());
    }

    // ---- Test 2: Invalid ISBN carries an example ----

    #[test]
    fn invalid_isbn_offers_example() {
        let mut library = in_memory(LibraryConfig::default());
        let err = library.add_book("T", "A", "invalid_isbn").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert_eq!(err.example(), Some(ISBN_EXAMPLE));
        assert!(library.list_books().unwrap().is_empty());
    }

    // ---- Test 3: Missing title creates nothing ----

    #[test]
    fn incomplete_book_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = on_disk(dir.path(), LibraryConfig::default());
        let err = library.add_book("", "A", ISBN).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompleteRecord);
        assert!(err.example().is_none());
        assert!(library.list_books().unwrap().is_empty());
        assert!(!dir.path().join("books.csv").exists());
    }

    // ---- Test 4: Checkout flow and repeat ----

    #[test]
    fn checkout_then_repeat() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = on_disk(dir.path(), LibraryConfig::default());
        library.add_user("Alice", "1").unwrap();
        library.add_book("T", "A", ISBN).unwrap();

        let receipt = library.checkout("1", ISBN).unwrap();
        assert_eq!(receipt.book.availability(), Availability::No);

        let books = library.list_books().unwrap();
        assert_eq!(books.len(), 1);
        assert!(!books[0].is_available());
        let users = library.list_users().unwrap();
        assert_eq!(users[0].held_books(), [ISBN]);

        let err = library.checkout("1", ISBN).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyCheckedOut);
        assert_eq!(library.checkouts().len(), 1);
    }

    // ---- Test 5: Unknown ISBN leaves the tables byte-identical ----

    #[test]
    fn unknown_isbn_leaves_files_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = on_disk(dir.path(), LibraryConfig::default());
        library.add_user("Alice", "1").unwrap();
        library.add_book("T", "A", ISBN).unwrap();
        let books = std::fs::read(dir.path().join("books.csv")).unwrap();
        let users = std::fs::read(dir.path().join("users.csv")).unwrap();

        let err = library.checkout("1", "978-0-000000-00-0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert_eq!(std::fs::read(dir.path().join("books.csv")).unwrap(), books);
        assert_eq!(std::fs::read(dir.path().join("users.csv")).unwrap(), users);
    }

    // ---- Test 6: Save, reload, and list loses and duplicates nothing ----

    #[test]
    fn save_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = on_disk(dir.path(), manual_save());
        library.add_book("Dune", "Herbert", "978-0-441-17271-7").unwrap();
        library.add_book("Emma", "Austen", "978-0-14-143958-7").unwrap();
        library.add_user("Alice", "1").unwrap();
        library.add_user("Bob", "2").unwrap();
        let summary = library.save().unwrap();
        assert_eq!(summary, SaveSummary { books: 2, users: 2 });
        library.checkout("2", "978-0-14-143958-7").unwrap();

        let book_fields = |library: &Library| -> Vec<(String, String, String, bool)> {
            library
                .list_books()
                .unwrap()
                .iter()
                .map(|b| {
                    (
                        b.title().to_string(),
                        b.author().to_string(),
                        b.isbn().to_string(),
                        b.is_available(),
                    )
                })
                .collect()
        };
        let user_fields = |library: &Library| -> Vec<(String, String, Vec<String>)> {
            library
                .list_users()
                .unwrap()
                .iter()
                .map(|u| {
                    (
                        u.name().to_string(),
                        u.id().to_string(),
                        u.held_books().to_vec(),
                    )
                })
                .collect()
        };
        let books_before = book_fields(&library);
        let users_before = user_fields(&library);

        assert_eq!(library.save().unwrap(), SaveSummary::default());

        library.reload();
        assert_eq!(book_fields(&library), books_before);
        assert_eq!(user_fields(&library), users_before);
        assert_eq!(books_before[1].0, "Emma");
        assert!(!books_before[1].3);
        assert_eq!(users_before[1].2, ["978-0-14-143958-7"]);
    }

    // ---- Test 6b: Checkout keeps the stored timestamp ----

    #[test]
    fn checkout_keeps_stored_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = on_disk(dir.path(), manual_save());
        library.add_book("T", "A", ISBN).unwrap();
        library.add_user("Alice", "1").unwrap();
        library.save().unwrap();

        // A save stamps its own time, which can be later than the add.
        let store = CsvTableStore::open(dir.path()).unwrap();
        let mut rows = store.load(libris_store::Table::Books).unwrap();
        rows[0].insert("timestamp".into(), "2024-01-01 10:00:00".into());
        store.overwrite(libris_store::Table::Books, &rows).unwrap();

        library.checkout("1", ISBN).unwrap();
        let rows = store.load(libris_store::Table::Books).unwrap();
        assert_eq!(rows[0]["AvailableInLibrary"], "No");
        assert_eq!(rows[0]["timestamp"], "2024-01-01 10:00:00");
    }

    // ---- Test 7: Duplicates are caught across processes ----

    #[test]
    fn duplicates_across_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut first = on_disk(dir.path(), LibraryConfig::default());
            first.add_book("T", "A", ISBN).unwrap();
            first.add_user("Alice", "1").unwrap();
        }

        let mut second = on_disk(dir.path(), LibraryConfig::default());
        assert_eq!(
            second.add_book("T", "A", ISBN).unwrap_err().kind(),
            ErrorKind::DuplicateKey
        );
        assert_eq!(
            second.add_user("Alice again", "01").unwrap_err().kind(),
            ErrorKind::DuplicateKey
        );
        second.checkout("01", ISBN).unwrap();
    }

    // ---- Test 8: Listing mode follows configuration ----

    #[test]
    fn listing_mode_from_config() {
        let store: Arc<dyn TableStore> = Arc::new(InMemoryTableStore::new());
        let mut union = Library::with_store(
            store,
            LibraryConfig {
                dedup_listings: false,
                ..LibraryConfig::default()
            },
        );
        union.add_book("T", "A", ISBN).unwrap();

        assert_eq!(union.list_books().unwrap().len(), 2);
        assert_eq!(union.list_books_with(ListMode::Deduplicated).unwrap().len(), 1);
    }

    // ---- Test 9: Status counts ----

    #[test]
    fn status_counts() {
        let mut library = in_memory(manual_save());
        library.add_book("T", "A", ISBN).unwrap();
        library.add_book("U", "B", "978-0-441-17271-7").unwrap();
        library.add_user("Alice", "1").unwrap();

        let before = library.status().unwrap();
        assert_eq!(before.books, 2);
        assert_eq!(before.unsaved_books, 2);
        assert_eq!(before.unsaved_users, 1);

        library.checkout("1", ISBN).unwrap();
        let after = library.status().unwrap();
        assert_eq!(after.books_available, 1);
        assert_eq!(after.unsaved_books, 1);
        assert_eq!(after.unsaved_users, 0);
        assert_eq!(after.checkouts, 1);
    }

    // ---- Test 10: Empty catalog checkout ----

    #[test]
    fn empty_catalog_checkout() {
        let mut library = in_memory(LibraryConfig::default());
        let err = library.checkout("1", ISBN).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyCatalog);
        assert!(err.to_string().contains("books and users"));
    }
}
