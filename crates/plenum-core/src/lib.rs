pub mod config;
pub mod date_key;
pub mod ledger;
pub mod normalize;
pub mod schema;
pub mod transcript;
pub mod types;

pub use config::{ConfigError, MissingSpeakerPolicy, Settings, TableFormat};
pub use date_key::{DateKey, date_key_from_name};
pub use ledger::{DateStatusEntry, Ledger, LedgerError, StatusFlag};
pub use normalize::normalize;
pub use schema::tables;
pub use types::{MatchRecord, TranscriptSegment, Utterance};
