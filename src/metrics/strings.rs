//! Short-string similarity: normalized edit distance and character n-grams.

use std::collections::BTreeSet;

use crate::model::SignalValue;

use super::{MetricInput, Similarity};

/// Levenshtein distance over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// `1 - distance / max(len_a, len_b)`. Two empty strings are identical.
pub fn normalized_levenshtein(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Edit-distance similarity of two labels, case-insensitive.
pub fn edit_similarity(a: &str, b: &str) -> Similarity {
    let (a, b) = (normalize(a), normalize(b));
    let distance = levenshtein(&a, &b);
    let reason = match distance {
        0 => "identical".to_string(),
        1 => "1 edit apart".to_string(),
        n => format!("{n} edits apart"),
    };
    Similarity::new(normalized_levenshtein(&a, &b), reason)
}

/// Distinct character n-grams of a string.
pub fn char_ngrams(s: &str, n: usize) -> BTreeSet<String> {
    let chars: Vec<char> = s.chars().collect();
    if n == 0 || chars.len() < n {
        return BTreeSet::new();
    }
    chars.windows(n).map(|w| w.iter().collect()).collect()
}

/// Jaccard index over character n-grams.
///
/// Falls back to edit distance when either string is shorter than `n`.
pub fn ngram_similarity(a: &str, b: &str, n: usize) -> Similarity {
    let (a, b) = (normalize(a), normalize(b));
    let n = n.max(1);
    if a.chars().count() < n || b.chars().count() < n {
        return edit_similarity(&a, &b);
    }
    let grams_a = char_ngrams(&a, n);
    let grams_b = char_ngrams(&b, n);
    let shared = grams_a.intersection(&grams_b).count();
    let union = grams_a.union(&grams_b).count();
    let value = if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    };
    Similarity::new(value, format!("{shared} of {union} {n}-grams shared"))
}

pub(super) fn evaluate_edit_distance(
    left: &SignalValue,
    right: &SignalValue,
    _input: &MetricInput<'_>,
) -> Option<Similarity> {
    match (left, right) {
        (SignalValue::Label(a), SignalValue::Label(b)) => Some(edit_similarity(a, b)),
        _ => None,
    }
}

pub(super) fn evaluate_ngram(
    left: &SignalValue,
    right: &SignalValue,
    input: &MetricInput<'_>,
) -> Option<Similarity> {
    match (left, right) {
        (SignalValue::Label(a), SignalValue::Label(b)) => {
            Some(ngram_similarity(a, b, input.params.ngram_size()))
        }
        _ => None,
    }
}
