use crate::error::StoreResult;
use crate::table::{Row, Table};

/// Durable storage for the catalog tables.
///
/// All implementations must satisfy these invariants:
/// - `load` on a table that does not exist returns an empty vector.
/// - `save_merged` only appends. Rows already stored keep their position
///   and content.
/// - `overwrite` replaces the whole table and is the only way to change an
///   existing row.
/// - All I/O errors are propagated, never silently ignored.
pub trait TableStore: Send + Sync {
    /// Read every row of `table`, in stored order.
    ///
    /// Returns an empty vector if the table has never been written.
    fn load(&self, table: Table) -> StoreResult<Vec<Row>>;

    /// Append the rows of `new_rows` whose `unique_key` value is not already
    /// stored, and return how many were appended.
    ///
    /// Each appended row is stamped with the current time and receives the
    /// table defaults (`AvailableInLibrary = Yes` for books, an empty
    /// `BookInHand` for users). The header is written only when the table is
    /// new or empty.
    fn save_merged(&self, table: Table, new_rows: &[Row], unique_key: &str) -> StoreResult<usize>;

    /// Replace the whole table with `rows`.
    fn overwrite(&self, table: Table, rows: &[Row]) -> StoreResult<()>;

    /// Whether `table` has been created.
    fn exists(&self, table: Table) -> StoreResult<bool>;

    /// Delete `table` entirely. Removing a table that does not exist is
    /// not an error.
    fn remove(&self, table: Table) -> StoreResult<()>;

    /// Merge-save both tables using their identity columns.
    ///
    /// Empty batches are skipped so that saving never creates an empty
    /// table. Returns the rows appended to books and users respectively.
    fn save_system_state(&self, books: &[Row], users: &[Row]) -> StoreResult<(usize, usize)> {
        let mut appended = (0, 0);
        if !books.is_empty() {
            appended.0 = self.save_merged(Table::Books, books, Table::Books.key_column())?;
        }
        if !users.is_empty() {
            appended.1 = self.save_merged(Table::Users, users, Table::Users.key_column())?;
        }
        Ok(appended)
    }
}
