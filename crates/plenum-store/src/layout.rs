//! Where things live on disk, and which date each file belongs to.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use plenum_core::{DateKey, TableFormat, date_key_from_name};
use tracing::{debug, warn};

use crate::StoreError;

/// Files in `dir` with the given extension, sorted by file name. A missing
/// directory lists as empty.
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, StoreError> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "directory does not exist");
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir).map_err(|source| StoreError::io(dir, source))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|source| StoreError::io(dir, source))?.path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Recording identifier: the transcript's file stem.
pub fn recording_key(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Date token of a file name, if any.
pub fn file_date(path: &Path) -> Option<DateKey> {
    path.file_name()
        .and_then(|name| date_key_from_name(&name.to_string_lossy()))
}

/// Transcript CSVs grouped by the date token in their names. Files without a
/// token are skipped with a warning.
pub fn transcripts_by_date(dir: &Path) -> Result<BTreeMap<DateKey, Vec<PathBuf>>, StoreError> {
    let mut buckets: BTreeMap<DateKey, Vec<PathBuf>> = BTreeMap::new();
    for path in list_files(dir, "csv")? {
        match file_date(&path) {
            Some(date) => buckets.entry(date).or_default().push(path),
            None => warn!(file = %path.display(), "transcript name carries no date, skipped"),
        }
    }
    Ok(buckets)
}

/// Cached utterance files, one per date.
pub fn utterances_by_date(dir: &Path) -> Result<BTreeMap<DateKey, PathBuf>, StoreError> {
    let mut buckets = BTreeMap::new();
    for path in list_files(dir, "json")? {
        match file_date(&path) {
            Some(date) => {
                buckets.insert(date, path);
            }
            None => warn!(file = %path.display(), "utterance file name carries no date, skipped"),
        }
    }
    Ok(buckets)
}

pub fn utterance_path(dir: &Path, date: DateKey) -> PathBuf {
    dir.join(format!("{date}.json"))
}

pub fn match_table_path(dir: &Path, date: DateKey, format: TableFormat) -> PathBuf {
    dir.join(format!("{date}_matched.{}", format.extension()))
}
