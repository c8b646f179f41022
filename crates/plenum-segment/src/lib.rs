//! Floor-session segmentation: turns a plenary protocol document into an
//! ordered list of attributable [`Utterance`](plenum_core::Utterance)s.

mod fields;
mod markup;
mod segmenter;

pub use fields::Speaker;
pub use segmenter::{SegmentError, SegmentedDocument, Segmenter};
