use libris_types::User;

use crate::error::CatalogResult;
use crate::repository::Repository;

/// Users registered this run plus those in the users table.
pub type UserRepository = Repository<User>;

impl Repository<User> {
    /// Validate and register a new user. IDs that are equivalent to a
    /// known ID (`"1"` and `"01"`) count as duplicates.
    pub fn add(&mut self, name: &str, id: &str) -> CatalogResult<&User> {
        let user = User::new(name, id)?;
        self.insert(user)
    }

    /// Append `isbn` to the held books of the in-memory copy of `user_id`.
    /// Returns `false` when the user only exists in storage.
    pub fn append_hold(&mut self, user_id: &str, isbn: &str) -> bool {
        self.update_in_memory(user_id, |user| user.add_hold(isbn))
    }
}
