//! Records exchanged between the segmenter, the matcher and the store.

use serde::{Deserialize, Serialize};

/// One attributable speech turn from a floor-session document.
///
/// Produced by the segmenter and cached as one JSON array per calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    /// Unique within one document: the speech node id, or `{id}-{seq:02}`
    /// when the node holds several turns.
    pub turn_id: String,
    pub speaker: String,
    /// Party, else short role, else long role, else empty.
    pub affiliation: String,
    /// The speaker's own paragraphs only.
    pub text: String,
}

/// One diarized ASR segment from a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub speaker_label: String,
    /// Seconds from the start of the recording.
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// A transcript segment attributed to a floor-session turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub source_turn_id: String,
    pub source_speaker: String,
    pub source_affiliation: String,
    /// Cosine similarity in `[0, 1]`.
    pub similarity: f64,
    pub segment_start: f64,
    pub segment_end: f64,
    pub segment_text: String,
    pub segment_speaker_label: String,
    pub source_text: String,
    /// File stem of the recording the segment came from.
    pub recording_key: String,
}

impl MatchRecord {
    /// Pair a segment with the turn it matched.
    pub fn new(
        recording_key: &str,
        segment: &TranscriptSegment,
        turn: &Utterance,
        similarity: f64,
    ) -> Self {
        Self {
            source_turn_id: turn.turn_id.clone(),
            source_speaker: turn.speaker.clone(),
            source_affiliation: turn.affiliation.clone(),
            similarity,
            segment_start: segment.start,
            segment_end: segment.end,
            segment_text: segment.text.clone(),
            segment_speaker_label: segment.speaker_label.clone(),
            source_text: turn.text.clone(),
            recording_key: recording_key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utterance_json_roundtrip() {
        let utt = Utterance {
            turn_id: "ID211500100".into(),
            speaker: "Friedrich Merz".into(),
            affiliation: "Bundeskanzler".into(),
            text: "Sehr geehrte Frau Präsidentin!".into(),
        };
        let json = serde_json::to_string(&utt).unwrap();
        let parsed: Utterance = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, utt);
    }

    #[test]
    fn match_record_copies_provenance() {
        let seg = TranscriptSegment {
            speaker_label: "SPEAKER_03".into(),
            start: 12.5,
            end: 19.0,
            text: "die Wirtschaft wächst stark".into(),
        };
        let turn = Utterance {
            turn_id: "ID1-02".into(),
            speaker: "Anna Beispiel".into(),
            affiliation: "SPD".into(),
            text: "die wirtschaft wächst".into(),
        };

        let rec = MatchRecord::new("01-02-2025_plenum", &seg, &turn, 0.91);
        assert_eq!(rec.source_turn_id, "ID1-02");
        assert_eq!(rec.source_affiliation, "SPD");
        assert_eq!(rec.segment_speaker_label, "SPEAKER_03");
        assert_eq!(rec.segment_start, 12.5);
        assert_eq!(rec.source_text, "die wirtschaft wächst");
        assert_eq!(rec.recording_key, "01-02-2025_plenum");
    }
}
