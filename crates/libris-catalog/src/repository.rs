use std::collections::HashSet;
use std::sync::Arc;

use libris_store::{columns, Row, TableStore};
use tracing::{debug, info, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::record::Record;

/// How a listing combines in-memory and stored records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListMode {
    /// Every in-memory record followed by every stored record. A record
    /// added and saved during this run appears twice.
    Union,
    /// One entry per key, preferring the in-memory version. In-memory
    /// records come first, then stored-only records in file order.
    #[default]
    Deduplicated,
}

/// Records of one kind: those created during this run plus those already
/// in the table store.
///
/// Stored rows are re-read on every query and never cached. Duplicate
/// detection always checks both sides, so a key saved by an earlier process
/// is rejected just like one added moments ago.
pub struct Repository<R: Record> {
    records: Vec<R>,
    store: Arc<dyn TableStore>,
}

impl<R: Record> Repository<R> {
    /// Create an empty repository over `store`.
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self {
            records: Vec::new(),
            store,
        }
    }

    /// Records created during this run, in insertion order.
    pub fn in_memory(&self) -> &[R] {
        &self.records
    }

    /// Decoded stored records, in file order.
    ///
    /// Rows that fail to decode are logged and skipped.
    pub fn stored(&self) -> CatalogResult<Vec<R>> {
        let rows = self.store.load(R::TABLE)?;
        let mut decoded = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            match R::from_row(row) {
                Ok(record) => decoded.push(record),
                Err(e) => {
                    warn!(table = %R::TABLE, index, error = %e, "skipping undecodable row");
                }
            }
        }
        Ok(decoded)
    }

    /// Normalized keys of every stored row, decodable or not.
    fn stored_keys(&self) -> CatalogResult<HashSet<String>> {
        let key_column = R::TABLE.key_column();
        Ok(self
            .store
            .load(R::TABLE)?
            .iter()
            .filter_map(|row| row.get(key_column))
            .map(|key| R::TABLE.normalize_key(key))
            .collect())
    }

    /// Whether `key` is taken in memory or in storage.
    pub fn contains_key(&self, key: &str) -> CatalogResult<bool> {
        let key = R::TABLE.normalize_key(key);
        if self.records.iter().any(|r| r.normalized_key() == key) {
            return Ok(true);
        }
        Ok(self.stored_keys()?.contains(&key))
    }

    /// Add a validated record, rejecting keys already present in memory or
    /// storage.
    pub fn insert(&mut self, record: R) -> CatalogResult<&R> {
        if self.contains_key(record.key())? {
            return Err(CatalogError::DuplicateKey {
                kind: R::KIND,
                field: R::KEY_LABEL,
                key: record.key().to_string(),
            });
        }
        info!(kind = R::KIND, key = record.key(), "record added");
        self.records.push(record);
        let index = self.records.len() - 1;
        Ok(&self.records[index])
    }

    /// In-memory records merged with stored ones.
    pub fn list(&self, mode: ListMode) -> CatalogResult<Vec<R>> {
        let stored = self.stored()?;
        let mut listing = self.records.clone();

        match mode {
            ListMode::Union => listing.extend(stored),
            ListMode::Deduplicated => {
                let mut seen: HashSet<String> =
                    self.records.iter().map(Record::normalized_key).collect();
                listing.extend(
                    stored
                        .into_iter()
                        .filter(|record| seen.insert(record.normalized_key())),
                );
            }
        }

        Ok(listing)
    }

    /// Look up a record by key in the deduplicated view.
    pub fn find(&self, key: &str) -> CatalogResult<Option<R>> {
        let key = R::TABLE.normalize_key(key);
        if let Some(record) = self.records.iter().find(|r| r.normalized_key() == key) {
            return Ok(Some(record.clone()));
        }
        Ok(self
            .stored()?
            .into_iter()
            .find(|r| r.normalized_key() == key))
    }

    /// Whether anything exists in memory or in storage.
    pub fn has_records(&self) -> CatalogResult<bool> {
        if !self.records.is_empty() {
            return Ok(true);
        }
        Ok(!self.store.load(R::TABLE)?.is_empty())
    }

    /// Merge-save the in-memory records. Returns the number of rows the
    /// store appended; records it already held are skipped.
    pub fn save_all(&self) -> CatalogResult<usize> {
        if self.records.is_empty() {
            return Ok(0);
        }
        let rows: Vec<Row> = self.records.iter().map(Record::to_row).collect();
        let appended = self
            .store
            .save_merged(R::TABLE, &rows, R::TABLE.key_column())?;
        debug!(table = %R::TABLE, appended, "saved in-memory records");
        Ok(appended)
    }

    /// Forget every in-memory record. Stored records are unaffected.
    pub fn clear_memory(&mut self) {
        self.records.clear();
    }

    /// Build the full contents of the table with `records` applied.
    ///
    /// Stored rows keep their order and any columns the entity does not
    /// model. The first stored row for each key takes the fields of the
    /// matching record; records with no stored row are appended at the end.
    pub fn rows_for_rewrite(&self, records: &[R]) -> CatalogResult<Vec<Row>> {
        let key_column = R::TABLE.key_column();
        let mut pending: Vec<Option<&R>> = records.iter().map(Some).collect();
        let mut rows = self.store.load(R::TABLE)?;

        for row in &mut rows {
            let Some(key) = row.get(key_column).map(|k| R::TABLE.normalize_key(k)) else {
                continue;
            };
            let matching = pending
                .iter_mut()
                .find(|slot| slot.is_some_and(|r| r.normalized_key() == key));
            if let Some(record) = matching.and_then(Option::take) {
                overlay(row, record.to_row());
            }
        }

        rows.extend(pending.into_iter().flatten().map(Record::to_row));
        Ok(rows)
    }

    /// Raw stored rows, in file order.
    pub fn snapshot(&self) -> CatalogResult<Vec<Row>> {
        Ok(self.store.load(R::TABLE)?)
    }

    /// Whether the backing table has been created.
    pub fn table_exists(&self) -> CatalogResult<bool> {
        Ok(self.store.exists(R::TABLE)?)
    }

    /// Delete the backing table.
    pub fn remove_stored(&self) -> CatalogResult<()> {
        self.store.remove(R::TABLE)?;
        debug!(table = %R::TABLE, "removed table");
        Ok(())
    }

    /// Replace the whole stored table with `rows`.
    pub fn replace_stored(&self, rows: &[Row]) -> CatalogResult<()> {
        self.store.overwrite(R::TABLE, rows)?;
        debug!(table = %R::TABLE, rows = rows.len(), "rewrote table");
        Ok(())
    }

    /// Apply `update` to the in-memory record with `key`, if there is one.
    pub(crate) fn update_in_memory(&mut self, key: &str, update: impl FnOnce(&mut R)) -> bool {
        let key = R::TABLE.normalize_key(key);
        match self.records.iter_mut().find(|r| r.normalized_key() == key) {
            Some(record) => {
                update(record);
                true
            }
            None => false,
        }
    }
}

/// Copy the fields of `fresh` over `row`. A stored timestamp is kept as
/// written; the record's own stamp only fills an empty one.
fn overlay(row: &mut Row, fresh: Row) {
    for (column, value) in fresh {
        if column == columns::TIMESTAMP
            && row.get(columns::TIMESTAMP).is_some_and(|t| !t.is_empty())
        {
            continue;
        }
        row.insert(column, value);
    }
}

impl<R: Record> std::fmt::Debug for Repository<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("table", &R::TABLE)
            .field("in_memory", &self.records.len())
            .finish()
    }
}
