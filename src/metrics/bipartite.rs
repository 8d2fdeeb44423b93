//! Capability ↔ need matching between two actors.

use itertools::Itertools;

use crate::model::SignalValue;

use super::sets::normalize_tags;
use super::{MetricInput, Similarity};

/// Share of `needs` covered by `capabilities`, plus the covered items.
///
/// An empty needs set is covered at 0.
pub fn coverage<S: AsRef<str>>(capabilities: &[S], needs: &[S]) -> (f64, Vec<String>) {
    let needs = normalize_tags(needs);
    if needs.is_empty() {
        return (0.0, Vec::new());
    }
    let capabilities = normalize_tags(capabilities);
    let covered: Vec<String> = needs.intersection(&capabilities).cloned().collect();
    (covered.len() as f64 / needs.len() as f64, covered)
}

/// Symmetric exchange score: the mean of the coverage in each direction.
///
/// A side that declares no needs contributes 0 rather than being skipped.
pub fn exchange<S: AsRef<str>>(
    a_capabilities: &[S],
    a_needs: &[S],
    b_capabilities: &[S],
    b_needs: &[S],
) -> Similarity {
    let (a_covers_b, covered_for_b) = coverage(a_capabilities, b_needs);
    let (b_covers_a, covered_for_a) = coverage(b_capabilities, a_needs);
    let covered: Vec<String> = covered_for_b
        .into_iter()
        .merge(covered_for_a)
        .dedup()
        .collect();

    let value = (a_covers_b + b_covers_a) / 2.0;
    let reason = format!(
        "covers {:.0}% and {:.0}% of declared needs",
        a_covers_b.max(b_covers_a) * 100.0,
        a_covers_b.min(b_covers_a) * 100.0
    );
    Similarity::new(value, reason).with_evidence(covered)
}

pub(super) fn evaluate(
    left: &SignalValue,
    right: &SignalValue,
    _input: &MetricInput<'_>,
) -> Option<Similarity> {
    match (left, right) {
        (
            SignalValue::Exchange {
                capabilities: a_caps,
                needs: a_needs,
            },
            SignalValue::Exchange {
                capabilities: b_caps,
                needs: b_needs,
            },
        ) => Some(exchange(a_caps, a_needs, b_caps, b_needs)),
        _ => None,
    }
}
