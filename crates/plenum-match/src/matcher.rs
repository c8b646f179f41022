//! Segment-to-turn matching against a per-date index.

use plenum_core::{MatchRecord, TranscriptSegment, Utterance, normalize};
use tracing::debug;

use crate::index::Search;

/// Minimum cosine similarity for a segment to be attributed to a turn.
pub const SIMILARITY_FLOOR: f64 = 0.6;

/// Attribute each segment of one recording to its most similar turn.
///
/// `index` must have been built from `utterances`, in the same order.
/// Segments with blank text are skipped without a query; hits below
/// [`SIMILARITY_FLOOR`] are dropped. Output follows segment order.
pub fn match_segments(
    recording_key: &str,
    segments: &[TranscriptSegment],
    utterances: &[Utterance],
    index: &impl Search,
) -> Vec<MatchRecord> {
    let mut records = Vec::new();
    let mut below_floor = 0usize;

    for segment in segments {
        if segment.text.trim().is_empty() || normalize(&segment.text).is_empty() {
            continue;
        }
        let Some(hit) = index.query(&segment.text) else {
            continue;
        };
        if hit.score < SIMILARITY_FLOOR {
            below_floor += 1;
            continue;
        }
        if let Some(turn) = utterances.get(hit.index) {
            records.push(MatchRecord::new(recording_key, segment, turn, hit.score));
        }
    }

    debug!(
        recording = recording_key,
        segments = segments.len(),
        matched = records.len(),
        below_floor,
        "matched recording"
    );
    records
}
