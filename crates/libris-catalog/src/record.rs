//! Mapping between catalog entities and stored rows.

use libris_store::{columns, Row, Table};
use libris_types::{
    format_timestamp, join_holds, parse_holds, parse_timestamp, Availability, Book, RecordError,
    User,
};

/// An entity that lives in one table and is identified by one column.
pub trait Record: Clone {
    /// The table holding this entity.
    const TABLE: Table;
    /// Entity name used in messages ("book", "user").
    const KIND: &'static str;
    /// Human label of the identity field ("ISBN", "user ID").
    const KEY_LABEL: &'static str;

    /// The identity value as stored.
    fn key(&self) -> &str;

    /// Encode as a stored row.
    fn to_row(&self) -> Row;

    /// Decode a stored row.
    fn from_row(row: &Row) -> Result<Self, RecordError>;

    /// The identity value normalized for comparison.
    fn normalized_key(&self) -> String {
        Self::TABLE.normalize_key(self.key())
    }
}

fn field<'a>(row: &'a Row, column: &str) -> &'a str {
    row.get(column).map(String::as_str).unwrap_or("")
}

fn row_of<const N: usize>(pairs: [(&str, String); N]) -> Row {
    pairs
        .into_iter()
        .map(|(column, value)| (column.to_string(), value))
        .collect()
}

impl Record for Book {
    const TABLE: Table = Table::Books;
    const KIND: &'static str = "book";
    const KEY_LABEL: &'static str = "ISBN";

    fn key(&self) -> &str {
        self.isbn()
    }

    fn to_row(&self) -> Row {
        row_of([
            (columns::TITLE, self.title().to_string()),
            (columns::AUTHOR, self.author().to_string()),
            (columns::ISBN, self.isbn().to_string()),
            (columns::AVAILABLE, self.availability().to_string()),
            (
                columns::TIMESTAMP,
                self.created_at()
                    .map(|ts| format_timestamp(&ts))
                    .unwrap_or_default(),
            ),
        ])
    }

    fn from_row(row: &Row) -> Result<Self, RecordError> {
        let available = match field(row, columns::AVAILABLE).trim() {
            "" => Availability::Yes,
            raw => raw.parse()?,
        };
        Book::restore(
            field(row, columns::TITLE),
            field(row, columns::AUTHOR),
            field(row, columns::ISBN),
            available,
            parse_timestamp(field(row, columns::TIMESTAMP)),
        )
    }
}

impl Record for User {
    const TABLE: Table = Table::Users;
    const KIND: &'static str = "user";
    const KEY_LABEL: &'static str = "user ID";

    fn key(&self) -> &str {
        self.id().as_str()
    }

    fn to_row(&self) -> Row {
        row_of([
            (columns::NAME, self.name().to_string()),
            (columns::USER_ID, self.id().to_string()),
            (columns::HELD_BOOKS, join_holds(self.held_books())),
            (columns::TIMESTAMP, String::new()),
        ])
    }

    fn from_row(row: &Row) -> Result<Self, RecordError> {
        User::restore(
            field(row, columns::NAME),
            field(row, columns::USER_ID),
            parse_holds(field(row, columns::HELD_BOOKS)),
        )
    }
}
