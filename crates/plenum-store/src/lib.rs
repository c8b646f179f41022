//! Storage layer: directory layout, utterance caches, transcript and match
//! tables, and the run ledger.

mod error;
mod table;

pub mod layout;
pub mod ledger;
pub mod matches;
pub mod transcripts;
pub mod utterances;

pub use error::StoreError;
pub use ledger::{load_ledger, save_ledger};
pub use matches::{merge_matches, read_matches, write_matches};
pub use transcripts::{read_transcript, write_transcript};
pub use utterances::{read_utterances, write_utterances};
