//! Speaker-turn clustering of diarized transcripts.

use crate::types::TranscriptSegment;

/// Merge consecutive segments that share a speaker label.
///
/// The merged segment keeps the first start, the latest end, and the
/// non-empty texts joined by a single space.
pub fn cluster(segments: &[TranscriptSegment]) -> Vec<TranscriptSegment> {
    let mut out: Vec<TranscriptSegment> = Vec::new();

    for seg in segments {
        let text = seg.text.trim();
        match out.last_mut() {
            Some(current) if current.speaker_label == seg.speaker_label => {
                current.end = current.end.max(seg.end);
                if !text.is_empty() {
                    if !current.text.is_empty() {
                        current.text.push(' ');
                    }
                    current.text.push_str(text);
                }
            }
            _ => out.push(TranscriptSegment {
                speaker_label: seg.speaker_label.clone(),
                start: seg.start,
                end: seg.end,
                text: text.to_string(),
            }),
        }
    }

    out
}
