use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::isbn::validate_isbn;
use crate::temporal;

/// Shelf status of a book, stored as `Yes` / `No`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    /// On the shelf and available for checkout.
    #[default]
    Yes,
    /// Checked out to a user.
    No,
}

impl Availability {
    /// The stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    /// Returns `true` if the book is on the shelf.
    pub fn is_available(self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("yes") || trimmed.eq_ignore_ascii_case("true") {
            Ok(Self::Yes)
        } else if trimmed.eq_ignore_ascii_case("no") || trimmed.eq_ignore_ascii_case("false") {
            Ok(Self::No)
        } else {
            Err(RecordError::InvalidFormat {
                field: "AvailableInLibrary",
                value: s.to_string(),
                example: "Yes",
            })
        }
    }
}

/// A catalogued book.
///
/// Identity is the ISBN. Title, author and ISBN are fixed once the record is
/// built; only [`Availability`] changes, and only through checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    title: String,
    author: String,
    isbn: String,
    available: Availability,
    created_at: Option<NaiveDateTime>,
}

impl Book {
    /// Validate user input and build a new, available book.
    ///
    /// Each field is trimmed. Empty fields are reported in the order title,
    /// author, ISBN; a malformed ISBN is reported after all fields are known
    /// to be present.
    pub fn new(title: &str, author: &str, isbn: &str) -> Result<Self, RecordError> {
        let title = require("title", title)?;
        let author = require("author", author)?;
        let isbn = require("ISBN", isbn)?;
        validate_isbn(isbn)?;

        Ok(Self {
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
            available: Availability::Yes,
            created_at: Some(temporal::now()),
        })
    }

    /// Rebuild a book from previously persisted values.
    ///
    /// Presence is still enforced, but the ISBN pattern is not: rows written
    /// before validation existed must keep loading.
    pub fn restore(
        title: &str,
        author: &str,
        isbn: &str,
        available: Availability,
        created_at: Option<NaiveDateTime>,
    ) -> Result<Self, RecordError> {
        Ok(Self {
            title: require("title", title)?.to_string(),
            author: require("author", author)?.to_string(),
            isbn: require("ISBN", isbn)?.to_string(),
            available,
            created_at,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn availability(&self) -> Availability {
        self.available
    }

    pub fn is_available(&self) -> bool {
        self.available.is_available()
    }

    /// When the record was first created, if known.
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.created_at
    }

    /// Flip the shelf status.
    pub fn set_availability(&mut self, available: Availability) {
        self.available = available;
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Title: {}, Author: {}, ISBN: {}",
            self.title, self.author, self.isbn
        )
    }
}

fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, RecordError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(RecordError::incomplete("book", field))
    } else {
        Ok(trimmed)
    }
}
