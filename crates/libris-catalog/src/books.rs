use libris_types::{Availability, Book};

use crate::error::CatalogResult;
use crate::repository::Repository;

/// Books added this run plus those in the books table.
pub type BookRepository = Repository<Book>;

impl Repository<Book> {
    /// Validate and add a new book.
    ///
    /// Validation runs before the duplicate check, so a malformed ISBN is
    /// reported as such even when a matching row exists.
    pub fn add(&mut self, title: &str, author: &str, isbn: &str) -> CatalogResult<&Book> {
        let book = Book::new(title, author, isbn)?;
        self.insert(book)
    }

    /// Set the availability of the in-memory copy of `isbn`. Returns
    /// `false` when the book only exists in storage.
    pub fn set_availability(&mut self, isbn: &str, available: Availability) -> bool {
        self.update_in_memory(isbn, |book| book.set_availability(available))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use libris_store::InMemoryTableStore;
    use libris_types::{ErrorKind, ISBN_EXAMPLE};

    use super::*;
    use crate::error::CatalogError;

    fn repo() -> BookRepository {
        BookRepository::new(Arc::new(InMemoryTableStore::new()))
    }

    #[test]
    fn add_once_then_duplicate() {
        let mut books = repo();
        let added = books.add("T", "A", ISBN_EXAMPLE).unwrap();
        assert_eq!(added.isbn(), ISBN_EXAMPLE);
        assert!(added.is_available());

        let err = books.add("Other", "B", ISBN_EXAMPLE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
        assert_eq!(
            err.to_string(),
            format!("a book with ISBN \"{ISBN_EXAMPLE}\" already exists")
        );
    }

    #[test]
    fn add_rejects_bad_input_without_creating() {
        let mut books = repo();
        let err = books.add("", "A", ISBN_EXAMPLE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompleteRecord);

        let err = books.add("T", "A", "invalid_isbn").unwrap_err();
        assert!(matches!(err, CatalogError::Record(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);

        assert!(books.in_memory().is_empty());
    }

    #[test]
    fn add_trims_fields() {
        let mut books = repo();
        let book = books.add("  Dune ", " Herbert", " 978-0-441-17271-7 ").unwrap();
        assert_eq!(book.title(), "Dune");
        assert_eq!(book.author(), "Herbert");
        assert_eq!(book.isbn(), "978-0-441-17271-7");
    }

    #[test]
    fn set_availability_touches_memory_only() {
        let mut books = repo();
        books.add("T", "A", ISBN_EXAMPLE).unwrap();
        assert!(books.set_availability(ISBN_EXAMPLE, Availability::No));
        assert!(!books.in_memory()[0].is_available());
        assert!(books.stored().unwrap().is_empty());
        assert!(!books.set_availability("978-1-1-1-1", Availability::No));
    }
}
