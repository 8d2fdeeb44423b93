//! Candidate prefiltering.
//!
//! Eligibility rules are hard filters. Pruning is conservative: a candidate
//! is only dropped when an upper bound on its score is already below the
//! threshold, so no candidate that would reach the threshold is ever lost.

use chrono::{DateTime, Utc};

use crate::metrics::{MetricInput, MetricKind, MetricRegistry, NumericMode};
use crate::model::Actor;

use super::engine::comparable_pair;
use super::profile::{SignalSpec, WeightProfile};

/// Hard eligibility rules for a candidate.
///
/// The region rule only applies when the source declares a region.
pub fn is_eligible(source: &Actor, candidate: &Actor, profile: &WeightProfile) -> bool {
    if !candidate.consent || candidate.id == source.id {
        return false;
    }
    if !profile.candidate_personas.is_empty()
        && !profile
            .candidate_personas
            .iter()
            .any(|persona| candidate.has_persona(persona))
    {
        return false;
    }
    if profile.same_region {
        if let Some(region) = source.region.as_deref() {
            let same = candidate
                .region
                .as_deref()
                .is_some_and(|r| r.trim().eq_ignore_ascii_case(region.trim()));
            if !same {
                return false;
            }
        }
    }
    true
}

/// Candidates from `population` passing [`is_eligible`], in input order.
pub fn eligible<'a>(
    source: &Actor,
    population: &'a [Actor],
    profile: &WeightProfile,
) -> Vec<&'a Actor> {
    population
        .iter()
        .filter(|candidate| is_eligible(source, candidate, profile))
        .collect()
}

/// Whether a signal can be evaluated exactly without the batch index.
fn exact_without_index(spec: &SignalSpec) -> bool {
    if spec.metric.is_cheap() {
        return true;
    }
    spec.metric == MetricKind::Numeric
        && match spec.params.numeric_mode() {
            NumericMode::Ratio => true,
            NumericMode::MinMax => spec.params.range.is_some(),
            NumericMode::ZScore => false,
        }
}

/// Upper bound on the pair's total score.
///
/// Cheap signals are evaluated exactly; every other comparable signal is
/// assumed to score 1. `None` when no signal is comparable.
pub fn upper_bound(
    registry: &MetricRegistry,
    source: &Actor,
    candidate: &Actor,
    profile: &WeightProfile,
    as_of: DateTime<Utc>,
) -> Option<f64> {
    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    for (signal, spec) in &profile.signals {
        let Some((left, right)) = comparable_pair(signal, spec, source, candidate) else {
            continue;
        };
        let value = if exact_without_index(spec) {
            let input = MetricInput {
                signal,
                params: &spec.params,
                left_id: &source.id,
                right_id: &candidate.id,
                as_of,
                text_index: None,
                numeric_stats: None,
            };
            match registry.evaluate(spec.metric, left, right, &input) {
                Some(sim) => sim.value,
                None => continue,
            }
        } else {
            1.0
        };
        weighted += value * spec.weight;
        weight_sum += spec.weight;
    }
    (weight_sum > 0.0).then(|| weighted / weight_sum)
}

/// Drop candidates whose upper bound is below `min_score`.
///
/// Candidates without any comparable signal are kept. With `min_score` at
/// 0 nothing is pruned.
pub fn prune<'a>(
    registry: &MetricRegistry,
    source: &Actor,
    candidates: &[&'a Actor],
    profile: &WeightProfile,
    min_score: f64,
    as_of: DateTime<Utc>,
) -> Vec<&'a Actor> {
    if min_score <= 0.0 {
        return candidates.to_vec();
    }
    candidates
        .iter()
        .copied()
        .filter(|candidate| {
            upper_bound(registry, source, candidate, profile, as_of)
                .is_none_or(|bound| bound + f64::EPSILON >= min_score)
        })
        .collect()
}
