//! Term-frequency / inverse-document-frequency vectors.
//!
//! Tokens are lower-cased runs of two or more word characters. IDF is
//! smoothed as `ln((1 + n) / (1 + df)) + 1`, weights are raw counts times
//! IDF, and every vector is L2-normalized so a dot product is a cosine.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

static TERM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Sparse L2-normalized vector: term index → weight. Ordered so sums are reproducible.
pub type SparseVector = BTreeMap<usize, f64>;

fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    TERM.find_iter(text).map(|m| m.as_str().to_lowercase())
}

/// Vocabulary and IDF weights fitted over a corpus.
#[derive(Debug, Clone)]
pub struct TfidfModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfModel {
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();

        for doc in documents {
            let mut seen: HashSet<usize> = HashSet::new();
            for term in terms(doc.as_ref()) {
                let next = vocabulary.len();
                let index = *vocabulary.entry(term).or_insert(next);
                if index == doc_freq.len() {
                    doc_freq.push(0);
                }
                if seen.insert(index) {
                    doc_freq[index] += 1;
                }
            }
        }

        let n = documents.len() as f64;
        let idf = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        Self { vocabulary, idf }
    }

    #[cfg(test)]
    pub(crate) fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Vectorize `text` in this space. Unknown terms are ignored; text with
    /// no known terms yields an empty vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut vector = SparseVector::new();
        for term in terms(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *vector.entry(index).or_insert(0.0) += self.idf[index];
            }
        }

        let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in vector.values_mut() {
                *weight /= norm;
            }
        }
        vector
    }
}

/// Cosine similarity of two normalized vectors. Zero when either is empty.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(index, weight)| large.get(index).map(|other| weight * other))
        .fold(0.0, |acc, product| acc + product)
}
