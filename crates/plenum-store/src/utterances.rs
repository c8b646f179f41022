//! Per-date utterance caches (`<DD-MM-YYYY>.json`, an array of utterances).

use std::io::Write;
use std::path::Path;

use plenum_core::Utterance;

use crate::StoreError;
use crate::table::write_atomic;

pub fn read_utterances(path: &Path) -> Result<Vec<Utterance>, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|source| StoreError::io(path, source))?;
    serde_json::from_str(&content).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_utterances(path: &Path, utterances: &[Utterance]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(utterances).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, |file| {
        file.write_all(json.as_bytes())
            .map_err(|source| StoreError::io(path, source))
    })
}
