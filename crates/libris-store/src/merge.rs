//! Merge-on-save row selection shared by every backend.
//!
//! Given the rows already stored in a table and a batch of candidate rows,
//! [`select_new_rows`] decides which candidates get appended. A candidate is
//! appended only if its key is not already stored and has not appeared
//! earlier in the same batch. Appended rows receive the table defaults and
//! a fresh timestamp.

use std::collections::HashSet;

use libris_types::{format_timestamp, now};
use tracing::warn;

use crate::table::{columns, Row, Table};

/// Pick the rows of `candidates` that should be appended to `table`.
///
/// `unique_key` names the column compared against `existing`. Candidates
/// without that column are skipped and logged.
pub fn select_new_rows(
    table: Table,
    existing: &[Row],
    candidates: &[Row],
    unique_key: &str,
) -> Vec<Row> {
    let mut seen: HashSet<String> = existing
        .iter()
        .filter_map(|row| row.get(unique_key))
        .map(|key| table.normalize_key(key))
        .collect();

    let stamp = format_timestamp(&now());
    let mut selected = Vec::new();

    for candidate in candidates {
        let Some(key) = candidate.get(unique_key) else {
            warn!(table = %table, unique_key, "row without key column skipped");
            continue;
        };
        if !seen.insert(table.normalize_key(key)) {
            continue;
        }
        let mut row = candidate.clone();
        table.apply_defaults(&mut row);
        row.insert(columns::TIMESTAMP.to_string(), stamp.clone());
        selected.push(row);
    }

    selected
}
