//! CSV plumbing shared by the transcript, match and ledger tables.
//!
//! Input CSVs are read by header name with every column as a nullable string;
//! typing happens per table. Empty cells read back as `""`. Every write goes
//! through a temporary sibling file that is renamed over the target.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use tempfile::NamedTempFile;

use crate::StoreError;

/// A CSV file held as string columns.
pub(crate) struct StringTable {
    path: PathBuf,
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl StringTable {
    pub(crate) fn read(path: &Path) -> Result<Self, StoreError> {
        let table_err = |source| StoreError::Table {
            path: path.to_path_buf(),
            source,
        };

        let (inferred, _) = Format::default()
            .with_header(true)
            .infer_schema(open(path)?, Some(0))
            .map_err(table_err)?;
        let fields: Vec<Field> = inferred
            .fields()
            .iter()
            .map(|f| Field::new(f.name().trim(), DataType::Utf8, true))
            .collect();
        let schema = Arc::new(Schema::new(fields));

        let reader = ReaderBuilder::new(schema.clone())
            .with_header(true)
            .build(open(path)?)
            .map_err(table_err)?;
        let batches = reader
            .collect::<Result<Vec<_>, _>>()
            .map_err(table_err)?;

        Ok(Self {
            path: path.to_path_buf(),
            schema,
            batches,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Position of the first column named by any of `aliases`.
    pub(crate) fn require(&self, aliases: &[&str]) -> Result<usize, StoreError> {
        aliases
            .iter()
            .find_map(|name| self.schema.index_of(name).ok())
            .ok_or_else(|| StoreError::MissingColumn {
                path: self.path.clone(),
                column: aliases.join(" | "),
            })
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = TableRow<'_>> {
        let mut seen = 0;
        self.batches.iter().flat_map(move |batch| {
            let first = seen + 1;
            seen += batch.num_rows();
            (0..batch.num_rows()).map(move |row| TableRow {
                batch,
                row,
                record: first + row,
            })
        })
    }

    pub(crate) fn malformed(&self, record: usize, reason: impl Into<String>) -> StoreError {
        StoreError::Malformed {
            path: self.path.clone(),
            record,
            reason: reason.into(),
        }
    }

    /// Parse a numeric cell, reporting the file and record on failure.
    pub(crate) fn float(&self, row: &TableRow<'_>, col: usize) -> Result<f64, StoreError> {
        let raw = row.get(col).trim();
        raw.parse().map_err(|_| {
            let name = self.schema.field(col).name();
            self.malformed(row.record, format!("{name}: not a number: {raw:?}"))
        })
    }
}

pub(crate) struct TableRow<'a> {
    batch: &'a RecordBatch,
    row: usize,
    /// 1-based data record, header excluded. Quoted cells may span lines, so
    /// this is not a line number.
    pub(crate) record: usize,
}

impl<'a> TableRow<'a> {
    pub(crate) fn get(&self, col: usize) -> &'a str {
        match self.batch.column(col).as_string_opt::<i32>() {
            Some(values) if !values.is_null(self.row) => values.value(self.row),
            _ => "",
        }
    }
}

fn open(path: &Path) -> Result<File, StoreError> {
    File::open(path).map_err(|source| StoreError::io(path, source))
}

/// Write one batch as CSV with a header row.
pub(crate) fn write_csv(path: &Path, batch: &RecordBatch) -> Result<(), StoreError> {
    write_atomic(path, |file| {
        let mut writer = WriterBuilder::new().with_header(true).build(file);
        writer.write(batch)?;
        Ok(())
    })
}

/// Write through a temporary file in the target's directory, then rename it
/// over the target.
pub(crate) fn write_atomic<F>(path: &Path, write: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut NamedTempFile) -> Result<(), StoreError>,
{
    let dir = parent_dir(path);
    std::fs::create_dir_all(dir).map_err(|source| StoreError::io(dir, source))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|source| StoreError::io(dir, source))?;
    write(&mut tmp)?;
    tmp.flush().map_err(|source| StoreError::io(tmp.path(), source))?;
    tmp.persist(path)
        .map_err(|err| StoreError::io(path, err.error))?;
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
