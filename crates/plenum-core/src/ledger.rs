//! Per-date, per-recording outcome ledger.
//!
//! The ledger is a key-value set keyed by `(session_date_key, recording_key)`.
//! Every run loads it, filters pairs already flagged [`StatusFlag::Matched`]
//! out of its work queue, and merges new outcomes back by key. `matched` is
//! monotonic: once recorded it is never replaced.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::date_key::{DateKey, date_key_from_name};

/// Outcome of pairing one recording with one session date.
///
/// Variant order is severity order: the most actionable problems sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusFlag {
    /// A session document exists for the date but no recording does.
    HangingSession,
    /// A recording exists for the date but no session document does.
    HangingRecording,
    /// The recording was matched but none of its segments cleared the floor.
    NoMatchesFound,
    /// At least one segment of the recording cleared the floor.
    Matched,
}

impl StatusFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HangingSession => "hanging_session",
            Self::HangingRecording => "hanging_recording",
            Self::NoMatchesFound => "no_matches_found",
            Self::Matched => "matched",
        }
    }

    pub const ALL: [StatusFlag; 4] = [
        Self::HangingSession,
        Self::HangingRecording,
        Self::NoMatchesFound,
        Self::Matched,
    ];
}

impl fmt::Display for StatusFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFlag {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s.trim())
            .ok_or_else(|| LedgerError::UnknownFlag(s.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("unknown ledger flag: {0:?}")]
    UnknownFlag(String),
}

/// One row of the persisted ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateStatusEntry {
    pub flag: StatusFlag,
    pub session_date_key: String,
    /// Recording file stem; empty for [`StatusFlag::HangingSession`].
    pub recording_key: String,
}

impl DateStatusEntry {
    /// The date embedded in the recording key, if any.
    pub fn recording_date(&self) -> Option<DateKey> {
        date_key_from_name(&self.recording_key)
    }

    /// Ledger sort order: severity, then recording date ascending (entries
    /// without one last), then session date, then recording key.
    fn ledger_cmp(&self, other: &Self) -> Ordering {
        self.flag
            .cmp(&other.flag)
            .then_with(|| cmp_missing_last(self.recording_date(), other.recording_date()))
            .then_with(|| {
                cmp_missing_last(
                    self.session_date_key.parse::<DateKey>().ok(),
                    other.session_date_key.parse::<DateKey>().ok(),
                )
            })
            .then_with(|| self.session_date_key.cmp(&other.session_date_key))
            .then_with(|| self.recording_key.cmp(&other.recording_key))
    }
}

fn cmp_missing_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

type LedgerKey = (String, String);

/// The deduplicated set of outcomes across all runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: BTreeMap<LedgerKey, StatusFlag>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted rows. Later duplicates merge under the same rules
    /// as [`record`](Self::record).
    pub fn from_entries(entries: impl IntoIterator<Item = DateStatusEntry>) -> Self {
        let mut ledger = Self::new();
        for entry in entries {
            ledger.insert(entry.session_date_key, entry.recording_key, entry.flag);
        }
        ledger
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn flag(&self, date: DateKey, recording_key: &str) -> Option<StatusFlag> {
        self.entries
            .get(&(date.to_string(), recording_key.to_string()))
            .copied()
    }

    /// Whether the pair already matched in an earlier run.
    pub fn is_matched(&self, date: DateKey, recording_key: &str) -> bool {
        self.flag(date, recording_key) == Some(StatusFlag::Matched)
    }

    /// Merge one outcome. A `matched` pair is never downgraded.
    pub fn record(&mut self, flag: StatusFlag, date: DateKey, recording_key: &str) {
        self.insert(date.to_string(), recording_key.to_string(), flag);
    }

    fn insert(&mut self, date: String, recording_key: String, flag: StatusFlag) {
        let slot = self.entries.entry((date, recording_key)).or_insert(flag);
        if *slot != StatusFlag::Matched {
            *slot = flag;
        }
    }

    /// Drop the `hanging_session` placeholder for a date that now has
    /// recordings.
    pub fn clear_hanging_session(&mut self, date: DateKey) {
        let key = (date.to_string(), String::new());
        if self.entries.get(&key) == Some(&StatusFlag::HangingSession) {
            self.entries.remove(&key);
        }
    }

    /// All entries in ledger order.
    pub fn sorted_entries(&self) -> Vec<DateStatusEntry> {
        let mut rows: Vec<DateStatusEntry> = self
            .entries
            .iter()
            .map(|((date, recording), flag)| DateStatusEntry {
                flag: *flag,
                session_date_key: date.clone(),
                recording_key: recording.clone(),
            })
            .collect();
        rows.sort_by(DateStatusEntry::ledger_cmp);
        rows
    }

    /// Entry count per flag, in severity order.
    pub fn counts(&self) -> [(StatusFlag, usize); 4] {
        StatusFlag::ALL.map(|flag| {
            let n = self.entries.values().filter(|f| **f == flag).count();
            (flag, n)
        })
    }
}
