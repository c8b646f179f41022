//! Diarized transcript CSVs.
//!
//! Columns are matched by header name: `speaker_label` (or `speaker`),
//! `start`, `end`, `text`. Extra columns are ignored.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::record_batch::RecordBatch;
use plenum_core::{TranscriptSegment, tables};

use crate::StoreError;
use crate::table::{StringTable, write_csv};

pub fn read_transcript(path: &Path) -> Result<Vec<TranscriptSegment>, StoreError> {
    let table = StringTable::read(path)?;
    let speaker = table.require(&["speaker_label", "speaker"])?;
    let start = table.require(&["start"])?;
    let end = table.require(&["end"])?;
    let text = table.require(&["text"])?;

    table
        .rows()
        .map(|row| {
            Ok(TranscriptSegment {
                speaker_label: row.get(speaker).to_string(),
                start: table.float(&row, start)?,
                end: table.float(&row, end)?,
                text: row.get(text).to_string(),
            })
        })
        .collect()
}

pub fn transcript_batch(segments: &[TranscriptSegment]) -> Result<RecordBatch, StoreError> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            segments.iter().map(|s| s.speaker_label.as_str()),
        )),
        Arc::new(Float64Array::from_iter_values(segments.iter().map(|s| s.start))),
        Arc::new(Float64Array::from_iter_values(segments.iter().map(|s| s.end))),
        Arc::new(StringArray::from_iter_values(
            segments.iter().map(|s| s.text.as_str()),
        )),
    ];
    let batch = RecordBatch::try_new(Arc::new(tables::transcript_segment_schema()), columns)?;
    Ok(batch)
}

pub fn write_transcript(path: &Path, segments: &[TranscriptSegment]) -> Result<(), StoreError> {
    write_csv(path, &transcript_batch(segments)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_speaker_alias_and_ignores_extra_columns() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "01-02-2025.csv",
            "start,end,speaker,text,confidence\n0.0,2.5,SPEAKER_00,\"Sehr geehrte, liebe\",0.9\n2.5,4,SPEAKER_01,,0.4\n",
        );
        let segs = read_transcript(&path).unwrap();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].speaker_label, "SPEAKER_00");
        assert_eq!(segs[0].text, "Sehr geehrte, liebe");
        assert_eq!(segs[1].end, 4.0);
        assert_eq!(segs[1].text, "");
    }

    #[test]
    fn bad_timestamp_reports_record() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "x.csv",
            "speaker_label,start,end,text\nA,0,1,\"erste\nzweite zeile\"\nA,zwei,3,kaputt\n",
        );
        let err = read_transcript(&path).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { record: 2, .. }), "{err}");
        assert!(err.to_string().contains("record 2"), "{err}");
    }

    #[test]
    fn missing_text_column_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "x.csv", "speaker_label,start,end\nA,0,1\n");
        assert!(matches!(
            read_transcript(&path),
            Err(StoreError::MissingColumn { .. })
        ));
    }

    #[test]
    fn written_transcript_reads_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clustered.csv");
        let segs = vec![
            TranscriptSegment {
                speaker_label: "SPEAKER_00".into(),
                start: 0.0,
                end: 4.25,
                text: "Frau Präsidentin, meine Damen und Herren".into(),
            },
            TranscriptSegment {
                speaker_label: "SPEAKER_01".into(),
                start: 4.25,
                end: 6.0,
                text: String::new(),
            },
        ];
        write_transcript(&path, &segs).unwrap();
        assert_eq!(read_transcript(&path).unwrap(), segs);
    }
}
