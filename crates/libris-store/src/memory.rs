use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::merge::select_new_rows;
use crate::table::{Row, Table};
use crate::traits::TableStore;

/// In-memory, HashMap-based table store.
///
/// Intended for tests and embedding. Tables are held behind a `RwLock`;
/// rows are cloned on read and write. Data is lost when the store is dropped.
pub struct InMemoryTableStore {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
}

impl InMemoryTableStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Number of rows stored in `table`.
    pub fn row_count(&self, table: Table) -> StoreResult<usize> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.get(&table).map_or(0, Vec::len))
    }

    /// Drop every table.
    pub fn clear(&self) -> StoreResult<()> {
        self.tables.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

impl Default for InMemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStore for InMemoryTableStore {
    fn load(&self, table: Table) -> StoreResult<Vec<Row>> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.get(&table).cloned().unwrap_or_default())
    }

    fn save_merged(&self, table: Table, new_rows: &[Row], unique_key: &str) -> StoreResult<usize> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let stored = tables.get(&table).map(Vec::as_slice).unwrap_or_default();
        let appended = select_new_rows(table, stored, new_rows, unique_key);
        let count = appended.len();
        if count > 0 {
            tables.entry(table).or_default().extend(appended);
        }
        Ok(count)
    }

    fn overwrite(&self, table: Table, rows: &[Row]) -> StoreResult<()> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        tables.insert(table, rows.to_vec());
        Ok(())
    }

    fn exists(&self, table: Table) -> StoreResult<bool> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.contains_key(&table))
    }

    fn remove(&self, table: Table) -> StoreResult<()> {
        self.tables.write().map_err(poisoned)?.remove(&table);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryTableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let books = self.row_count(Table::Books).unwrap_or_default();
        let users = self.row_count(Table::Users).unwrap_or_default();
        f.debug_struct("InMemoryTableStore")
            .field("books", &books)
            .field("users", &users)
            .finish()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Poisoned(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(isbn: &str) -> Row {
        [("title", "T"), ("author", "A"), ("isbn", isbn)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_store_has_no_tables() {
        let store = InMemoryTableStore::new();
        assert!(!store.exists(Table::Books).unwrap());
        assert!(store.load(Table::Users).unwrap().is_empty());
    }

    #[test]
    fn save_merged_appends_new_keys_only() {
        let store = InMemoryTableStore::new();
        assert_eq!(store.save_merged(Table::Books, &[book("1")], "isbn").unwrap(), 1);
        assert_eq!(
            store
                .save_merged(Table::Books, &[book("1"), book("2")], "isbn")
                .unwrap(),
            1
        );
        let rows = store.load(Table::Books).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["isbn"], "1");
        assert_eq!(rows[1]["AvailableInLibrary"], "Yes");
    }

    #[test]
    fn merge_without_new_rows_creates_no_table() {
        let store = InMemoryTableStore::new();
        assert_eq!(store.save_merged(Table::Users, &[], "UserID").unwrap(), 0);
        assert!(!store.exists(Table::Users).unwrap());
    }

    #[test]
    fn overwrite_replaces_table() {
        let store = InMemoryTableStore::new();
        store
            .save_merged(Table::Books, &[book("1"), book("2")], "isbn")
            .unwrap();
        store.overwrite(Table::Books, &[book("3")]).unwrap();
        let rows = store.load(Table::Books).unwrap();
        assert_eq!(rows, vec![book("3")]);
    }

    #[test]
    fn clear_drops_everything() {
        let store = InMemoryTableStore::new();
        store.overwrite(Table::Users, &[]).unwrap();
        assert!(store.exists(Table::Users).unwrap());
        store.clear().unwrap();
        assert!(!store.exists(Table::Users).unwrap());
        assert_eq!(store.row_count(Table::Users).unwrap(), 0);
    }

    #[test]
    fn debug_reports_counts() {
        let store = InMemoryTableStore::new();
        store.save_merged(Table::Books, &[book("1")], "isbn").unwrap();
        let dbg = format!("{store:?}");
        assert!(dbg.contains("books: 1"));
    }
}
