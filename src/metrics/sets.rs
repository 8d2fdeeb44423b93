//! Set and frequency-vector similarity over tags.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::SignalValue;

use super::{MetricInput, Similarity};

/// Trim, lowercase and deduplicate a tag list. Blank tags are dropped.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> BTreeSet<String> {
    tags.iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Jaccard index of two tag sets: |A ∩ B| / |A ∪ B|.
///
/// Two empty sets share no information and score 0.
pub fn jaccard<S: AsRef<str>>(a: &[S], b: &[S]) -> Similarity {
    let a = normalize_tags(a);
    let b = normalize_tags(b);
    let union = a.union(&b).count();
    if union == 0 {
        return Similarity::zero("no tags on either side");
    }
    let shared: Vec<String> = a.intersection(&b).cloned().collect();
    let value = shared.len() as f64 / union as f64;
    let reason = format!("{} shared of {}", shared.len(), union);
    Similarity::new(value, reason).with_evidence(shared)
}

/// Fold a tag list into a frequency vector, counting repeats.
pub fn tag_frequencies<S: AsRef<str>>(tags: &[S]) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() {
            *counts.entry(tag).or_insert(0.0) += 1.0;
        }
    }
    counts
}

/// Cosine similarity of two tag-frequency vectors.
///
/// Non-finite and non-positive frequencies are ignored; a zero vector on
/// either side scores 0.
pub fn cosine(a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>) -> Similarity {
    let a = clean_vector(a);
    let b = clean_vector(b);
    let norm_a = a.values().map(|v| v * v).sum::<f64>().sqrt();
    let norm_b = b.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 || !norm_a.is_finite() || !norm_b.is_finite() {
        return Similarity::zero("no weighted tags on either side");
    }

    let mut shared = Vec::new();
    let mut dot = 0.0;
    for (tag, weight) in &a {
        if let Some(other) = b.get(tag) {
            dot += weight * other;
            shared.push(tag.clone());
        }
    }
    let reason = format!("{} weighted tags in common", shared.len());
    Similarity::new(dot / (norm_a * norm_b), reason).with_evidence(shared)
}

fn clean_vector(vector: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let mut cleaned = BTreeMap::new();
    for (tag, weight) in vector {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || !weight.is_finite() || *weight <= 0.0 {
            continue;
        }
        *cleaned.entry(tag).or_insert(0.0) += weight;
    }
    cleaned
}

pub(super) fn evaluate_jaccard(
    left: &SignalValue,
    right: &SignalValue,
    _input: &MetricInput<'_>,
) -> Option<Similarity> {
    match (left, right) {
        (SignalValue::Tags(a), SignalValue::Tags(b)) => Some(jaccard(a, b)),
        _ => None,
    }
}

pub(super) fn evaluate_cosine(
    left: &SignalValue,
    right: &SignalValue,
    _input: &MetricInput<'_>,
) -> Option<Similarity> {
    let a = frequencies_of(left)?;
    let b = frequencies_of(right)?;
    Some(cosine(&a, &b))
}

fn frequencies_of(value: &SignalValue) -> Option<BTreeMap<String, f64>> {
    match value {
        SignalValue::Tags(tags) => Some(tag_frequencies(tags)),
        SignalValue::TagCounts(counts) => Some(counts.clone()),
        _ => None,
    }
}
