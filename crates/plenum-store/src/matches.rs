//! Per-date match tables (`<DD-MM-YYYY>_matched.csv` or `.parquet`).

use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, StringArray};
use arrow::datatypes::Float64Type;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use plenum_core::{MatchRecord, TableFormat, tables};
use tracing::debug;

use crate::StoreError;
use crate::table::{StringTable, write_atomic, write_csv};

pub fn match_batch(records: &[MatchRecord]) -> Result<RecordBatch, StoreError> {
    let strings = |f: fn(&MatchRecord) -> &str| -> ArrayRef {
        Arc::new(StringArray::from_iter_values(records.iter().map(f)))
    };
    let floats = |f: fn(&MatchRecord) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from_iter_values(records.iter().map(f)))
    };

    let columns = vec![
        strings(|r| r.source_turn_id.as_str()),
        strings(|r| r.source_speaker.as_str()),
        strings(|r| r.source_affiliation.as_str()),
        floats(|r| r.similarity),
        floats(|r| r.segment_start),
        floats(|r| r.segment_end),
        strings(|r| r.segment_text.as_str()),
        strings(|r| r.segment_speaker_label.as_str()),
        strings(|r| r.source_text.as_str()),
        strings(|r| r.recording_key.as_str()),
    ];
    let batch = RecordBatch::try_new(Arc::new(tables::match_record_schema()), columns)?;
    Ok(batch)
}

pub fn write_matches(
    path: &Path,
    format: TableFormat,
    records: &[MatchRecord],
) -> Result<(), StoreError> {
    let batch = match_batch(records)?;
    match format {
        TableFormat::Csv => write_csv(path, &batch),
        TableFormat::Parquet => write_atomic(path, |file| {
            let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
            writer.write(&batch)?;
            writer.close()?;
            Ok(())
        }),
    }
}

pub fn read_matches(path: &Path, format: TableFormat) -> Result<Vec<MatchRecord>, StoreError> {
    match format {
        TableFormat::Csv => read_csv(path),
        TableFormat::Parquet => read_parquet(path),
    }
}

fn read_csv(path: &Path) -> Result<Vec<MatchRecord>, StoreError> {
    let table = StringTable::read(path)?;
    let col: Vec<usize> = tables::MATCH_COLUMNS
        .iter()
        .map(|name| table.require(&[*name]))
        .collect::<Result<_, _>>()?;

    table
        .rows()
        .map(|row| {
            Ok(MatchRecord {
                source_turn_id: row.get(col[0]).to_string(),
                source_speaker: row.get(col[1]).to_string(),
                source_affiliation: row.get(col[2]).to_string(),
                similarity: table.float(&row, col[3])?,
                segment_start: table.float(&row, col[4])?,
                segment_end: table.float(&row, col[5])?,
                segment_text: row.get(col[6]).to_string(),
                segment_speaker_label: row.get(col[7]).to_string(),
                source_text: row.get(col[8]).to_string(),
                recording_key: row.get(col[9]).to_string(),
            })
        })
        .collect()
}

fn read_parquet(path: &Path) -> Result<Vec<MatchRecord>, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::io(path, source))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        let turn_id = string_column(&batch, path, "source_turn_id")?;
        let speaker = string_column(&batch, path, "source_speaker")?;
        let affiliation = string_column(&batch, path, "source_affiliation")?;
        let similarity = float_column(&batch, path, "similarity")?;
        let start = float_column(&batch, path, "segment_start")?;
        let end = float_column(&batch, path, "segment_end")?;
        let segment_text = string_column(&batch, path, "segment_text")?;
        let label = string_column(&batch, path, "segment_speaker_label")?;
        let source_text = string_column(&batch, path, "source_text")?;
        let recording = string_column(&batch, path, "recording_key")?;

        for row in 0..batch.num_rows() {
            records.push(MatchRecord {
                source_turn_id: cell(turn_id, row),
                source_speaker: cell(speaker, row),
                source_affiliation: cell(affiliation, row),
                similarity: similarity.value(row),
                segment_start: start.value(row),
                segment_end: end.value(row),
                segment_text: cell(segment_text, row),
                segment_speaker_label: cell(label, row),
                source_text: cell(source_text, row),
                recording_key: cell(recording, row),
            });
        }
    }
    Ok(records)
}

fn string_column<'a>(
    batch: &'a RecordBatch,
    path: &Path,
    name: &str,
) -> Result<&'a StringArray, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_string_opt::<i32>())
        .ok_or_else(|| missing(path, name))
}

fn float_column<'a>(
    batch: &'a RecordBatch,
    path: &Path,
    name: &str,
) -> Result<&'a Float64Array, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_primitive_opt::<Float64Type>())
        .ok_or_else(|| missing(path, name))
}

fn cell(values: &StringArray, row: usize) -> String {
    if values.is_null(row) {
        String::new()
    } else {
        values.value(row).to_string()
    }
}

fn missing(path: &Path, column: &str) -> StoreError {
    StoreError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    }
}

/// Replace the records of `processed` recordings in a date's match table.
///
/// Rows of other recordings already in the table are kept ahead of `fresh`.
/// Nothing is written when the result would be empty. Returns the number of
/// rows in the table afterwards.
pub fn merge_matches(
    path: &Path,
    format: TableFormat,
    processed: &BTreeSet<String>,
    fresh: Vec<MatchRecord>,
) -> Result<usize, StoreError> {
    let mut records = if path.exists() {
        read_matches(path, format)?
    } else {
        Vec::new()
    };
    let before = records.len();
    records.retain(|r| !processed.contains(&r.recording_key));
    debug!(
        file = %path.display(),
        kept = records.len(),
        replaced = before - records.len(),
        added = fresh.len(),
        "merging match table"
    );
    records.extend(fresh);

    if records.is_empty() {
        return Ok(0);
    }
    write_matches(path, format, &records)?;
    Ok(records.len())
}
