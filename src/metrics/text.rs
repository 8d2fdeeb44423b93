//! Free-text similarity: cosine of TF-IDF vectors over a batch corpus.
//!
//! The [`Corpus`] is built once per batch from the population's text
//! signals and is read-only afterwards, so scoring workers share it by
//! reference.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use unicode_normalization::UnicodeNormalization;

use crate::model::{Actor, SignalValue};

use super::{MetricInput, Similarity};

const STOPWORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has",
    "have", "i", "in", "into", "is", "it", "its", "me", "my", "of", "on", "or", "our", "so",
    "that", "the", "their", "this", "to", "us", "was", "we", "were", "what", "who", "will",
    "with", "you", "your",
];

/// Lowercased, NFKC-normalized alphanumeric tokens without stopwords or
/// single characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text.nfkc().collect::<String>().to_lowercase();
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 1 && !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Document frequencies for one text signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextIndex {
    documents: usize,
    document_frequency: HashMap<String, usize>,
}

impl TextIndex {
    /// Index a set of documents. Each document counts a term once.
    pub fn build<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index = Self::default();
        for doc in documents {
            index.documents += 1;
            let terms: BTreeSet<String> = tokenize(doc).into_iter().collect();
            for term in terms {
                *index.document_frequency.entry(term).or_insert(0) += 1;
            }
        }
        index
    }

    pub const fn documents(&self) -> usize {
        self.documents
    }

    pub fn vocabulary_size(&self) -> usize {
        self.document_frequency.len()
    }

    /// Smoothed inverse document frequency: `ln((1 + N) / (1 + df)) + 1`.
    pub fn idf(&self, term: &str) -> f64 {
        let df = self.document_frequency.get(term).copied().unwrap_or(0);
        ((1.0 + self.documents as f64) / (1.0 + df as f64)).ln() + 1.0
    }

    /// TF-IDF vector of a document, with term frequency normalized by
    /// document length.
    pub fn vector(&self, text: &str) -> BTreeMap<String, f64> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return BTreeMap::new();
        }
        let total = tokens.len() as f64;
        let mut counts: BTreeMap<String, f64> = BTreeMap::new();
        for token in tokens {
            *counts.entry(token).or_insert(0.0) += 1.0;
        }
        counts
            .into_iter()
            .map(|(term, count)| {
                let weight = (count / total) * self.idf(&term);
                (term, weight)
            })
            .collect()
    }

    /// Cosine similarity of the TF-IDF vectors of two documents.
    pub fn similarity(&self, a: &str, b: &str) -> Similarity {
        let va = self.vector(a);
        let vb = self.vector(b);
        let norm_a = va.values().map(|w| w * w).sum::<f64>().sqrt();
        let norm_b = vb.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return Similarity::zero("no descriptive text on one side");
        }

        let mut shared: Vec<(String, f64)> = va
            .iter()
            .filter_map(|(term, wa)| vb.get(term).map(|wb| (term.clone(), wa * wb)))
            .collect();
        let dot: f64 = shared.iter().map(|(_, w)| w).sum();

        shared.sort_by(|x, y| y.1.total_cmp(&x.1).then_with(|| x.0.cmp(&y.0)));
        let evidence: Vec<String> = shared.iter().take(3).map(|(t, _)| t.clone()).collect();
        let reason = if evidence.is_empty() {
            "no overlapping terms".to_string()
        } else {
            format!("{} overlapping terms", shared.len())
        };
        Similarity::new(dot / (norm_a * norm_b), reason).with_evidence(evidence)
    }
}

/// Batch-scoped TF-IDF indexes, one per text signal name.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    indexes: BTreeMap<String, TextIndex>,
}

impl Corpus {
    /// Build indexes for the named signals over every actor carrying a
    /// text bundle under that name.
    pub fn build<S: AsRef<str>>(signals: &[S], actors: &[&Actor]) -> Self {
        let indexes = signals
            .iter()
            .map(|signal| {
                let signal = signal.as_ref();
                let docs = actors.iter().filter_map(|actor| match actor.signal(signal) {
                    Some(SignalValue::Text(text)) => Some(text.as_str()),
                    _ => None,
                });
                (signal.to_string(), TextIndex::build(docs))
            })
            .collect();
        Self { indexes }
    }

    pub fn index(&self, signal: &str) -> Option<&TextIndex> {
        self.indexes.get(signal)
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Total documents indexed across all signals.
    pub fn documents(&self) -> usize {
        self.indexes.values().map(TextIndex::documents).sum()
    }
}

pub(super) fn evaluate(
    left: &SignalValue,
    right: &SignalValue,
    input: &MetricInput<'_>,
) -> Option<Similarity> {
    let (SignalValue::Text(a), SignalValue::Text(b)) = (left, right) else {
        return None;
    };
    let sim = match input.text_index {
        Some(index) => index.similarity(a, b),
        None => {
            tracing::debug!(signal = input.signal, "no corpus for text signal, indexing pair");
            TextIndex::build([a.as_str(), b.as_str()]).similarity(a, b)
        }
    };
    Some(sim)
}
