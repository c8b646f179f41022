//! Batch pipeline: session documents to utterance caches, then per-date
//! matching of recordings with ledger bookkeeping.
//!
//! Dates are processed one at a time in calendar order. The ledger is loaded
//! once, updated in memory, and written back whole at the end of the run.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use plenum_core::{DateKey, Ledger, Settings, StatusFlag, Utterance};
use plenum_match::{Search, SimilarityIndex, match_segments};
use plenum_segment::Segmenter;
use plenum_store::layout::{self, recording_key};
use plenum_store::{load_ledger, merge_matches, read_transcript, read_utterances, save_ledger};
use tracing::{debug, info, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SegmentStats {
    pub documents: usize,
    pub skipped: usize,
    pub dates: usize,
    pub utterances: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub dates: usize,
    pub matched: usize,
    pub already_matched: usize,
    pub no_matches: usize,
    pub hanging_recordings: usize,
    pub hanging_sessions: usize,
    pub records_written: usize,
    /// Recordings or dates skipped because an input file could not be read.
    pub unreadable: usize,
}

/// Segment every session document and write one utterance cache per date.
pub fn segment_protocols(settings: &Settings) -> anyhow::Result<SegmentStats> {
    let segmenter = Segmenter::new(settings.missing_speaker);
    let files = layout::list_files(&settings.protocol_dir, "xml")
        .with_context(|| format!("listing {}", settings.protocol_dir.display()))?;

    let mut stats = SegmentStats::default();
    let mut by_date: BTreeMap<DateKey, Vec<Utterance>> = BTreeMap::new();

    for path in &files {
        let doc = match segmenter.segment_file(path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping session document");
                stats.skipped += 1;
                continue;
            }
        };
        let Some(date) = layout::file_date(path).or(doc.session_date) else {
            warn!(file = %path.display(), "session document has no date, skipped");
            stats.skipped += 1;
            continue;
        };
        debug!(
            file = %path.display(),
            date = %date,
            utterances = doc.utterances.len(),
            "segmented"
        );
        stats.documents += 1;
        by_date.entry(date).or_default().extend(doc.utterances);
    }

    for (date, utterances) in &by_date {
        let path = layout::utterance_path(&settings.utterance_dir, *date);
        plenum_store::write_utterances(&path, utterances)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(date = %date, utterances = utterances.len(), "wrote utterances");
        stats.utterances += utterances.len();
    }
    stats.dates = by_date.len();
    Ok(stats)
}

/// Match all pending recordings against their date's utterances.
pub fn match_recordings(settings: &Settings) -> anyhow::Result<RunStats> {
    match_with(settings, SimilarityIndex::build)
}

/// [`match_recordings`] with a caller-supplied index. `build_index` is called
/// at most once per date, and only when the date has pending recordings.
pub fn match_with<S, F>(settings: &Settings, mut build_index: F) -> anyhow::Result<RunStats>
where
    S: Search,
    F: FnMut(&[Utterance]) -> S,
{
    let sessions = layout::utterances_by_date(&settings.utterance_dir)
        .with_context(|| format!("listing {}", settings.utterance_dir.display()))?;
    let recordings = layout::transcripts_by_date(&settings.transcript_dir)
        .with_context(|| format!("listing {}", settings.transcript_dir.display()))?;
    let mut ledger = load_ledger(&settings.ledger_path)
        .with_context(|| format!("loading ledger {}", settings.ledger_path.display()))?;

    let dates: BTreeSet<DateKey> = sessions.keys().chain(recordings.keys()).copied().collect();
    let mut stats = RunStats {
        dates: dates.len(),
        ..RunStats::default()
    };

    for date in dates {
        match (sessions.get(&date), recordings.get(&date)) {
            (Some(session), Some(recs)) => {
                let mut job = DateJob {
                    settings,
                    date,
                    ledger: &mut ledger,
                    stats: &mut stats,
                };
                job.run(session, recs, &mut build_index)?;
            }
            (None, Some(recs)) => {
                for path in recs {
                    let key = recording_key(path);
                    if ledger.is_matched(date, &key) {
                        continue;
                    }
                    warn!(date = %date, recording = %key, "no session document for recording");
                    ledger.record(StatusFlag::HangingRecording, date, &key);
                    stats.hanging_recordings += 1;
                }
            }
            (Some(_), None) => {
                debug!(date = %date, "no recording for session");
                ledger.record(StatusFlag::HangingSession, date, "");
                stats.hanging_sessions += 1;
            }
            (None, None) => {}
        }
    }

    save_ledger(&settings.ledger_path, &ledger)
        .with_context(|| format!("saving ledger {}", settings.ledger_path.display()))?;
    Ok(stats)
}

/// Matching state for one date with both a session and recordings.
struct DateJob<'a> {
    settings: &'a Settings,
    date: DateKey,
    ledger: &'a mut Ledger,
    stats: &'a mut RunStats,
}

impl DateJob<'_> {
    fn run<S, F>(
        &mut self,
        session: &Path,
        recordings: &[PathBuf],
        build_index: &mut F,
    ) -> anyhow::Result<()>
    where
        S: Search,
        F: FnMut(&[Utterance]) -> S,
    {
        let date = self.date;
        let pending: Vec<&PathBuf> = recordings
            .iter()
            .filter(|path| !self.ledger.is_matched(date, &recording_key(path)))
            .collect();
        self.stats.already_matched += recordings.len() - pending.len();
        if pending.is_empty() {
            debug!(date = %date, "all recordings already matched");
            self.ledger.clear_hanging_session(date);
            return Ok(());
        }

        let utterances = match read_utterances(session) {
            Ok(u) => u,
            Err(e) => {
                warn!(date = %date, error = %e, "skipping date with unreadable utterances");
                self.stats.unreadable += 1;
                return Ok(());
            }
        };
        let index = build_index(&utterances);

        let mut processed = BTreeSet::new();
        let mut fresh = Vec::new();
        for path in pending {
            let key = recording_key(path);
            let segments = match read_transcript(path) {
                Ok(s) => s,
                Err(e) => {
                    warn!(
                        date = %date,
                        recording = %key,
                        error = %e,
                        "skipping unreadable transcript"
                    );
                    self.stats.unreadable += 1;
                    continue;
                }
            };

            let records = match_segments(&key, &segments, &utterances, &index);
            let flag = if records.is_empty() {
                self.stats.no_matches += 1;
                StatusFlag::NoMatchesFound
            } else {
                self.stats.matched += 1;
                StatusFlag::Matched
            };
            info!(
                date = %date,
                recording = %key,
                segments = segments.len(),
                records = records.len(),
                flag = %flag,
                "processed recording"
            );

            self.ledger.record(flag, date, &key);
            processed.insert(key);
            fresh.extend(records);
        }
        if processed.is_empty() {
            return Ok(());
        }
        self.ledger.clear_hanging_session(date);

        let added = fresh.len();
        let format = self.settings.match_format;
        let table = layout::match_table_path(&self.settings.matched_dir, date, format);
        merge_matches(&table, format, &processed, fresh)
            .with_context(|| format!("writing {}", table.display()))?;
        self.stats.records_written += added;
        Ok(())
    }
}
