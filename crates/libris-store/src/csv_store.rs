use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::merge::select_new_rows;
use crate::table::{Row, Table};
use crate::traits::TableStore;

/// CSV-file table store.
///
/// Each table lives in `<root>/<table>.csv` with a header row and one record
/// per line, using standard CSV quoting for embedded commas and quotes.
/// Appends go straight to the end of the file; full rewrites go through a
/// temporary file in the same directory that is then renamed over the table.
#[derive(Debug, Clone)]
pub struct CsvTableStore {
    root: PathBuf,
}

impl CsvTableStore {
    /// Open (or create) a storage directory.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened CSV table store");
        Ok(Self { root })
    }

    /// The storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `table`.
    pub fn path(&self, table: Table) -> PathBuf {
        self.root.join(table.file_name())
    }

    /// Read the header and every row. A missing file reads as no header and
    /// no rows; so does a zero-length file.
    fn read_table(&self, table: Table) -> StoreResult<(Vec<String>, Vec<Row>)> {
        let path = self.path(table);
        if !path.is_file() {
            return Ok((Vec::new(), Vec::new()));
        }

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(&path)?;
        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() > header.len() {
                warn!(
                    table = %table,
                    line = record.position().map_or(0, |p| p.line()),
                    fields = record.len(),
                    columns = header.len(),
                    "record has more fields than the header; extra fields ignored"
                );
            }
            let row: Row = header
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect();
            rows.push(row);
        }

        debug!(table = %table, rows = rows.len(), "loaded table");
        Ok((header, rows))
    }

    /// Append `rows` to the end of the table file, optionally preceded by
    /// the header.
    fn append_rows(
        &self,
        table: Table,
        header: &[String],
        write_header: bool,
        rows: &[Row],
    ) -> StoreResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(self.path(table))?;
        if !ends_with_line_break(&mut file)? {
            file.write_all(b"\n")?;
        }
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(header)?;
        }
        for row in rows {
            writer.write_record(project(header, row))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Replace the table file with `header` and `rows`.
    fn replace_table(&self, table: Table, header: &[String], rows: &[Row]) -> StoreResult<()> {
        let path = self.path(table);
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        {
            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            writer.write_record(header)?;
            for row in rows {
                writer.write_record(project(header, row))?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Persist {
            path: path.display().to_string(),
            source: e.error,
        })?;
        Ok(())
    }
}

impl TableStore for CsvTableStore {
    fn load(&self, table: Table) -> StoreResult<Vec<Row>> {
        let (_, rows) = self.read_table(table)?;
        Ok(rows)
    }

    fn save_merged(&self, table: Table, new_rows: &[Row], unique_key: &str) -> StoreResult<usize> {
        let (header, existing) = self.read_table(table)?;
        let appended = select_new_rows(table, &existing, new_rows, unique_key);
        if appended.is_empty() {
            debug!(table = %table, "nothing new to save");
            return Ok(0);
        }

        if header.is_empty() {
            let header = table.header_for(&appended);
            self.append_rows(table, &header, true, &appended)?;
        } else if appended
            .iter()
            .flat_map(|row| row.keys())
            .all(|col| header.contains(col))
        {
            self.append_rows(table, &header, false, &appended)?;
        } else {
            // The stored header lacks columns the new rows carry (a file
            // written by an older layout). Widen it; stored rows keep their
            // order and values.
            let mut rows = existing;
            rows.extend(appended.iter().cloned());
            let mut widened = header;
            for col in table.header_for(&rows) {
                if !widened.contains(&col) {
                    widened.push(col);
                }
            }
            debug!(table = %table, columns = widened.len(), "widening table header");
            self.replace_table(table, &widened, &rows)?;
        }

        debug!(table = %table, appended = appended.len(), "merged rows into table");
        Ok(appended.len())
    }

    fn overwrite(&self, table: Table, rows: &[Row]) -> StoreResult<()> {
        let header = table.header_for(rows);
        self.replace_table(table, &header, rows)?;
        debug!(table = %table, rows = rows.len(), "rewrote table");
        Ok(())
    }

    fn exists(&self, table: Table) -> StoreResult<bool> {
        Ok(self.path(table).is_file())
    }

    fn remove(&self, table: Table) -> StoreResult<()> {
        match fs::remove_file(self.path(table)) {
            Ok(()) => {
                debug!(table = %table, "removed table");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Whether `file` is empty or its last byte terminates a line.
fn ends_with_line_break(file: &mut File) -> StoreResult<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(matches!(last[0], b'\n' | b'\r'))
}

/// Values of `row` in `header` order; absent columns are written empty.
fn project<'a>(header: &'a [String], row: &'a Row) -> impl Iterator<Item = &'a str> {
    header
        .iter()
        .map(move |col| row.get(col).map(String::as_str).unwrap_or(""))
}
