//! Ledger persistence: one CSV (`flag, session_date_key, recording_key`),
//! rewritten whole on every save.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::record_batch::RecordBatch;
use plenum_core::{DateStatusEntry, Ledger, StatusFlag, tables};
use tracing::{debug, info};

use crate::StoreError;
use crate::table::{StringTable, write_csv};

/// Load the ledger. A missing file is an empty ledger; anything unreadable
/// is an error.
pub fn load_ledger(path: &Path) -> Result<Ledger, StoreError> {
    if !path.exists() {
        debug!(path = %path.display(), "no ledger yet");
        return Ok(Ledger::new());
    }

    let table = StringTable::read(path)?;
    let flag = table.require(&["flag"])?;
    let date = table.require(&["session_date_key"])?;
    let recording = table.require(&["recording_key"])?;

    let entries = table
        .rows()
        .map(|row| {
            let flag: StatusFlag = row
                .get(flag)
                .parse()
                .map_err(|e: plenum_core::LedgerError| table.malformed(row.record, e.to_string()))?;
            Ok(DateStatusEntry {
                flag,
                session_date_key: row.get(date).trim().to_string(),
                recording_key: row.get(recording).trim().to_string(),
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    let ledger = Ledger::from_entries(entries);
    debug!(path = %table.path().display(), entries = ledger.len(), "loaded ledger");
    Ok(ledger)
}

pub fn ledger_batch(ledger: &Ledger) -> Result<RecordBatch, StoreError> {
    let rows = ledger.sorted_entries();
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|e| e.flag.as_str()))),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|e| e.session_date_key.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|e| e.recording_key.as_str()),
        )),
    ];
    let batch = RecordBatch::try_new(Arc::new(tables::ledger_schema()), columns)?;
    Ok(batch)
}

/// Write the whole ledger in sorted order, replacing the file atomically.
pub fn save_ledger(path: &Path, ledger: &Ledger) -> Result<(), StoreError> {
    write_csv(path, &ledger_batch(ledger)?)?;
    info!(path = %path.display(), entries = ledger.len(), "saved ledger");
    Ok(())
}
