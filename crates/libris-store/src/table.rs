use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use libris_types::UserId;

/// One stored record: column name to raw string value.
pub type Row = BTreeMap<String, String>;

/// Column names as they appear in the table headers.
pub mod columns {
    pub const TITLE: &str = "title";
    pub const AUTHOR: &str = "author";
    pub const ISBN: &str = "isbn";
    pub const AVAILABLE: &str = "AvailableInLibrary";
    pub const NAME: &str = "Name";
    pub const USER_ID: &str = "UserID";
    pub const HELD_BOOKS: &str = "BookInHand";
    pub const TIMESTAMP: &str = "timestamp";
}

const BOOK_COLUMNS: &[&str] = &[
    columns::TITLE,
    columns::AUTHOR,
    columns::ISBN,
    columns::AVAILABLE,
    columns::TIMESTAMP,
];

const USER_COLUMNS: &[&str] = &[
    columns::NAME,
    columns::USER_ID,
    columns::HELD_BOOKS,
    columns::TIMESTAMP,
];

/// The tables the catalog persists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Books,
    Users,
}

impl Table {
    /// Every table, in the order they are saved.
    pub const ALL: [Table; 2] = [Table::Books, Table::Users];

    /// Short lowercase name, used in logs and messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Users => "users",
        }
    }

    /// File name of the table inside a storage directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Books => "books.csv",
            Self::Users => "users.csv",
        }
    }

    /// The fixed column set, in header order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Books => BOOK_COLUMNS,
            Self::Users => USER_COLUMNS,
        }
    }

    /// The identity column.
    pub fn key_column(self) -> &'static str {
        match self {
            Self::Books => columns::ISBN,
            Self::Users => columns::USER_ID,
        }
    }

    /// Normalize a key value so that equivalent keys compare equal.
    ///
    /// User IDs use [`UserId`] equivalence (`"01"` and `"1"` are the same
    /// user); every other key is compared by its trimmed text.
    pub fn normalize_key(self, raw: &str) -> String {
        match self {
            Self::Users => UserId::new(raw).canonical(),
            Self::Books => raw.trim().to_string(),
        }
    }

    /// Fill the per-table defaults for a row about to be appended.
    ///
    /// Books default to available; users default to holding nothing. A
    /// blank value counts as absent.
    pub fn apply_defaults(self, row: &mut Row) {
        let (column, default) = match self {
            Self::Books => (columns::AVAILABLE, "Yes"),
            Self::Users => (columns::HELD_BOOKS, ""),
        };
        let value = row.entry(column.to_string()).or_default();
        if value.trim().is_empty() {
            *value = default.to_string();
        }
    }

    /// Header for writing `rows`: the fixed columns first, then any extra
    /// columns found in the rows, sorted.
    pub fn header_for<'a>(self, rows: impl IntoIterator<Item = &'a Row>) -> Vec<String> {
        let fixed = self.columns();
        let extra: BTreeSet<&str> = rows
            .into_iter()
            .flat_map(|row| row.keys())
            .map(String::as_str)
            .filter(|col| !fixed.iter().any(|known| known == col))
            .collect();
        fixed
            .iter()
            .copied()
            .chain(extra)
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
