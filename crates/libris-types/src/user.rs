use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// An externally supplied user identifier.
///
/// Identifiers arrive as free text, often with incidental formatting
/// (`"1"`, `" 01"`, `"+1"`). Two IDs are equal when their canonical forms
/// match: integers compare by value, anything else by trimmed text.
/// `Eq` and `Hash` follow the canonical form, so a `HashSet<UserId>` never
/// holds two spellings of the same patron.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw identifier, trimming surrounding whitespace.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    /// The identifier as entered (trimmed).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is blank.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Canonical form used for comparison.
    pub fn canonical(&self) -> String {
        let trimmed = self.0.trim();
        match trimmed.parse::<i128>() {
            Ok(n) => n.to_string(),
            Err(_) => trimmed.to_string(),
        }
    }

    /// Returns `true` if both identifiers name the same user.
    pub fn is_equivalent(&self, other: &str) -> bool {
        self.canonical() == Self::new(other).canonical()
    }
}

impl PartialEq for UserId {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for UserId {}

impl Hash for UserId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered library user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    name: String,
    id: UserId,
    held_books: Vec<String>,
}

impl User {
    /// Validate user input and build a user holding no books.
    pub fn new(name: &str, id: &str) -> Result<Self, RecordError> {
        Self::restore(name, id, Vec::new())
    }

    /// Rebuild a user from persisted values.
    pub fn restore(name: &str, id: &str, held_books: Vec<String>) -> Result<Self, RecordError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RecordError::incomplete("user", "name"));
        }
        let id = UserId::new(id);
        if id.is_empty() {
            return Err(RecordError::incomplete("user", "user ID"));
        }
        Ok(Self {
            name: name.to_string(),
            id,
            held_books,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// ISBNs currently checked out to this user, in checkout order.
    pub fn held_books(&self) -> &[String] {
        &self.held_books
    }

    /// Returns `true` if the user already holds `isbn`.
    pub fn holds(&self, isbn: &str) -> bool {
        let isbn = isbn.trim();
        self.held_books.iter().any(|held| held == isbn)
    }

    /// Append an ISBN to the held-items list.
    pub fn add_hold(&mut self, isbn: &str) {
        self.held_books.push(isbn.trim().to_string());
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name: {}, User ID: {}", self.name, self.id)
    }
}

/// Split a stored held-items field into ISBNs.
///
/// Entries are comma-separated; whitespace around entries and empty entries
/// are dropped, so both `a,b` and `a, b` decode the same way.
pub fn parse_holds(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join held ISBNs into their stored single-field form.
pub fn join_holds(holds: &[String]) -> String {
    holds.join(",")
}
