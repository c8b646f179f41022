//! Character n-gram TF-IDF index over one date's utterances.
//!
//! N-grams of length 3 to 5 are taken inside word boundaries: every
//! whitespace-separated word is padded with one space on each side and a
//! window slides over it. A padded word shorter than the window contributes
//! itself once and stops the widening. Term frequency is sub-linear
//! (`1 + ln tf`), document frequency smoothed (`ln((1 + n) / (1 + df)) + 1`),
//! and every row is L2-normalized, so cosine similarity is a dot product.

use std::collections::{BTreeMap, BTreeSet};

use plenum_core::{Utterance, normalize};
use tracing::debug;

const MIN_N: usize = 3;
const MAX_N: usize = 5;

/// Best-scoring utterance for a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Position of the utterance in the slice the index was built from.
    pub index: usize,
    /// Cosine similarity in `[0, 1]`.
    pub score: f64,
}

/// Lookup of the most similar utterance for a piece of transcript text.
pub trait Search {
    /// `None` when the query cannot be vectorized or the index is empty.
    fn query(&self, text: &str) -> Option<Hit>;
}

/// Sparse row: `(column, weight)` pairs in ascending column order.
type Row = Vec<(usize, f64)>;

pub struct SimilarityIndex {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<Row>,
}

impl SimilarityIndex {
    /// Build an index with one row per utterance, in slice order.
    pub fn build(utterances: &[Utterance]) -> Self {
        Self::from_texts(utterances.iter().map(|u| u.text.as_str()))
    }

    pub fn from_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let counts: Vec<BTreeMap<String, usize>> = texts
            .into_iter()
            .map(|text| ngram_counts(&normalize(text)))
            .collect();

        let terms: BTreeSet<&str> = counts
            .iter()
            .flat_map(|doc| doc.keys().map(String::as_str))
            .collect();
        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(col, term)| (term.to_string(), col))
            .collect();

        let mut df = vec![0usize; vocabulary.len()];
        for doc in &counts {
            for term in doc.keys() {
                if let Some(&col) = vocabulary.get(term) {
                    df[col] += 1;
                }
            }
        }

        let n = counts.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let rows = counts
            .iter()
            .map(|doc| weigh(doc, &vocabulary, &idf))
            .collect();

        debug!(
            rows = counts.len(),
            vocabulary = vocabulary.len(),
            "built similarity index"
        );

        Self {
            vocabulary,
            idf,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

}

impl Search for SimilarityIndex {
    fn query(&self, text: &str) -> Option<Hit> {
        if self.rows.is_empty() || self.vocabulary.is_empty() {
            return None;
        }
        let normalized = normalize(text);
        if normalized.is_empty() {
            return None;
        }

        let query: BTreeMap<usize, f64> =
            weigh(&ngram_counts(&normalized), &self.vocabulary, &self.idf)
                .into_iter()
                .collect();
        if query.is_empty() {
            return None;
        }

        let mut best = Hit {
            index: 0,
            score: f64::NEG_INFINITY,
        };
        for (index, row) in self.rows.iter().enumerate() {
            let score = dot(row, &query);
            if score > best.score {
                best = Hit { index, score };
            }
        }
        best.score = best.score.min(1.0);
        Some(best)
    }
}

/// Count the word-bounded character n-grams of already normalized text.
fn ngram_counts(text: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for word in text.split_whitespace() {
        let padded: Vec<char> = std::iter::once(' ')
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();

        for n in MIN_N..=MAX_N {
            if padded.len() <= n {
                *counts.entry(padded.iter().collect()).or_insert(0) += 1;
                break;
            }
            for window in padded.windows(n) {
                *counts.entry(window.iter().collect()).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Sub-linear TF-IDF weights of one document, L2-normalized. Unknown terms
/// are ignored; an all-zero vector comes back empty.
fn weigh(
    counts: &BTreeMap<String, usize>,
    vocabulary: &BTreeMap<String, usize>,
    idf: &[f64],
) -> Row {
    let mut row: Row = counts
        .iter()
        .filter_map(|(term, &tf)| {
            let col = *vocabulary.get(term)?;
            Some((col, (1.0 + (tf as f64).ln()) * idf[col]))
        })
        .collect();
    row.sort_by_key(|&(col, _)| col);

    let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in row.iter_mut() {
            *w /= norm;
        }
        row
    } else {
        Vec::new()
    }
}

fn dot(row: &Row, query: &BTreeMap<usize, f64>) -> f64 {
    row.iter()
        .filter_map(|(col, w)| query.get(col).map(|q| w * q))
        .sum()
}
