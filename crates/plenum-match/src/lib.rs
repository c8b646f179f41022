//! Lexical matching of transcript segments against floor-session turns.
//!
//! One [`SimilarityIndex`] is built per calendar date from that date's
//! utterances; [`match_segments`] queries it once per segment and keeps hits
//! at or above [`SIMILARITY_FLOOR`].

mod index;
mod matcher;

pub use index::{Hit, Search, SimilarityIndex};
pub use matcher::{SIMILARITY_FLOOR, match_segments};
