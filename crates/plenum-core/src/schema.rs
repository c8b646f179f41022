/// Arrow schema definitions for the tables Plenum reads and writes.
pub mod tables {
    use arrow::datatypes::{DataType, Field, Schema};

    /// Column names of the match table, in file order.
    pub const MATCH_COLUMNS: [&str; 10] = [
        "source_turn_id",
        "source_speaker",
        "source_affiliation",
        "similarity",
        "segment_start",
        "segment_end",
        "segment_text",
        "segment_speaker_label",
        "source_text",
        "recording_key",
    ];

    /// Schema for the per-date match table.
    pub fn match_record_schema() -> Schema {
        Schema::new(vec![
            Field::new("source_turn_id", DataType::Utf8, false),
            Field::new("source_speaker", DataType::Utf8, true),
            Field::new("source_affiliation", DataType::Utf8, true),
            Field::new("similarity", DataType::Float64, false),
            Field::new("segment_start", DataType::Float64, true),
            Field::new("segment_end", DataType::Float64, true),
            Field::new("segment_text", DataType::Utf8, true),
            Field::new("segment_speaker_label", DataType::Utf8, true),
            Field::new("source_text", DataType::Utf8, true),
            Field::new("recording_key", DataType::Utf8, true),
        ])
    }

    /// Schema for a diarized transcript as written by `plenum cluster`.
    pub fn transcript_segment_schema() -> Schema {
        Schema::new(vec![
            Field::new("speaker_label", DataType::Utf8, true),
            Field::new("start", DataType::Float64, false),
            Field::new("end", DataType::Float64, false),
            Field::new("text", DataType::Utf8, true),
        ])
    }

    /// Schema for the run ledger.
    pub fn ledger_schema() -> Schema {
        Schema::new(vec![
            Field::new("flag", DataType::Utf8, false),
            Field::new("session_date_key", DataType::Utf8, true),
            Field::new("recording_key", DataType::Utf8, true),
        ])
    }
}
