//! The match engine: pairwise scoring, batch index construction, and
//! parallel batch ranking.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{RapportError, Result};
use crate::metrics::{
    Corpus, MetricInput, MetricKind, MetricRegistry, NumericStats, TextIndex,
};
use crate::model::{Actor, Contribution, Match, MatchStatus, SignalValue, clamp_unit};

use super::prefilter;
use super::profile::{SignalSpec, WeightProfile};
use super::reasons;

/// Engine-wide knobs, usually taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Score batch candidates on the rayon pool.
    pub parallel: bool,
    /// Reasons rendered per match (1..=3).
    pub max_reasons: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_reasons: reasons::MAX_REASONS,
        }
    }
}

/// Per-request batch parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchOptions {
    pub top_k: usize,
    /// Overrides the profile's `min_score` when set.
    pub min_score: Option<f64>,
    /// Reference instant; also the timestamp of every produced match.
    pub as_of: DateTime<Utc>,
}

impl BatchOptions {
    pub const fn new(top_k: usize, as_of: DateTime<Utc>) -> Self {
        Self {
            top_k,
            min_score: None,
            as_of,
        }
    }

    #[must_use]
    pub const fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(RapportError::InvalidRequest(
                "top_k must be at least 1".to_string(),
            ));
        }
        if let Some(min_score) = self.min_score {
            if !min_score.is_finite() || !(0.0..=1.0).contains(&min_score) {
                return Err(RapportError::InvalidRequest(format!(
                    "min_score must be within [0, 1], got {min_score}"
                )));
            }
        }
        Ok(())
    }
}

/// Ranked result of a batch plus the funnel counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub matches: Vec<Match>,
    /// Actors offered as candidates.
    pub population: usize,
    /// Candidates passing the eligibility rules.
    pub eligible: usize,
    /// Eligible candidates removed by upper-bound pruning.
    pub pruned: usize,
    /// Pairs fully scored.
    pub scored: usize,
}

/// Read-only data shared by every pair in a batch: a text index per
/// free-text signal and population statistics per numeric signal.
///
/// Built once before any pair is scored.
#[derive(Debug, Clone, Default)]
pub struct BatchIndex {
    corpus: Corpus,
    numeric: BTreeMap<String, NumericStats>,
}

impl BatchIndex {
    /// Build the index for `profile` over `actors`.
    pub fn build(profile: &WeightProfile, actors: &[&Actor]) -> Self {
        let corpus = Corpus::build(&profile.signals_using(MetricKind::Tfidf), actors);
        let numeric = profile
            .signals_using(MetricKind::Numeric)
            .into_iter()
            .filter_map(|signal| {
                let values = actors.iter().filter_map(|actor| match actor.signal(signal) {
                    Some(SignalValue::Scalar(v)) => Some(*v),
                    _ => None,
                });
                NumericStats::from_values(values).map(|stats| (signal.to_string(), stats))
            })
            .collect();
        Self { corpus, numeric }
    }

    /// Index for a lone pair: a two-document corpus and no numeric
    /// population statistics.
    pub fn for_pair(profile: &WeightProfile, source: &Actor, candidate: &Actor) -> Self {
        Self {
            corpus: Corpus::build(&profile.signals_using(MetricKind::Tfidf), &[source, candidate]),
            numeric: BTreeMap::new(),
        }
    }

    pub const fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn text_index(&self, signal: &str) -> Option<&TextIndex> {
        self.corpus.index(signal)
    }

    pub fn numeric_stats(&self, signal: &str) -> Option<&NumericStats> {
        self.numeric.get(signal)
    }
}

/// Content hash naming a match: profile, source, candidate and instant.
pub fn match_id(profile: &str, source: &str, candidate: &str, as_of: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    for part in [profile, source, candidate, as_of.to_rfc3339().as_str()] {
        hasher.update(part.as_bytes());
        hasher.update(b"|");
    }
    let digest = hasher.finalize();
    digest.iter().take(16).fold(String::with_capacity(32), |mut hex, byte| {
        let _ = write!(hex, "{byte:02x}");
        hex
    })
}

/// Both bundles for `signal`, when each side carries one the metric accepts.
pub(crate) fn comparable_pair<'a>(
    signal: &str,
    spec: &SignalSpec,
    source: &'a Actor,
    candidate: &'a Actor,
) -> Option<(&'a SignalValue, &'a SignalValue)> {
    let left = source.signal(signal)?;
    let right = candidate.signal(signal)?;
    (spec.metric.accepts(left) && spec.metric.accepts(right)).then_some((left, right))
}

/// Scores actor pairs under weight profiles.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    registry: MetricRegistry,
    options: EngineOptions,
}

impl MatchEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            registry: MetricRegistry::with_defaults(),
            options,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: MetricRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub const fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub const fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Score one ordered pair with no reference population.
    ///
    /// The text index covers only the two actors, and numeric signals that
    /// need population statistics (z-score, min-max without a declared
    /// range) are not comparable.
    pub fn score_pair(
        &self,
        source: &Actor,
        candidate: &Actor,
        profile: &WeightProfile,
        as_of: DateTime<Utc>,
    ) -> Result<Match> {
        self.score_pair_within(source, candidate, &[], profile, as_of)
    }

    /// Score one ordered pair, taking the text corpus and numeric statistics
    /// from `population` plus the pair itself.
    pub fn score_pair_within(
        &self,
        source: &Actor,
        candidate: &Actor,
        population: &[Actor],
        profile: &WeightProfile,
        as_of: DateTime<Utc>,
    ) -> Result<Match> {
        profile.validate()?;
        for actor in [source, candidate] {
            if !actor.consent {
                return Err(RapportError::ConsentWithheld(actor.id.clone()));
            }
        }
        if source.id == candidate.id {
            return Err(RapportError::InvalidRequest(format!(
                "cannot match actor '{}' with itself",
                source.id
            )));
        }
        let index = if population.is_empty() {
            BatchIndex::for_pair(profile, source, candidate)
        } else {
            let mut actors: Vec<&Actor> = Vec::with_capacity(population.len() + 2);
            actors.push(source);
            actors.push(candidate);
            actors.extend(
                population
                    .iter()
                    .filter(|actor| actor.id != source.id && actor.id != candidate.id),
            );
            BatchIndex::build(profile, &actors)
        };
        Ok(self.score_indexed(source, candidate, profile, &index, as_of))
    }

    /// Score `source` against `population` and return the top matches.
    pub fn batch(
        &self,
        source: &Actor,
        population: &[Actor],
        profile: &WeightProfile,
        options: &BatchOptions,
    ) -> Result<BatchOutcome> {
        profile.validate()?;
        options.validate()?;
        if !source.consent {
            return Err(RapportError::ConsentWithheld(source.id.clone()));
        }
        let min_score = options.min_score.unwrap_or(profile.min_score);
        let as_of = options.as_of;

        let eligible = prefilter::eligible(source, population, profile);

        let mut indexed: Vec<&Actor> = Vec::with_capacity(eligible.len() + 1);
        indexed.push(source);
        indexed.extend(eligible.iter().copied());
        let index = BatchIndex::build(profile, &indexed);
        tracing::debug!(
            profile = %profile.name,
            population = population.len(),
            eligible = eligible.len(),
            documents = index.corpus().documents(),
            "batch index built"
        );

        let survivors =
            prefilter::prune(&self.registry, source, &eligible, profile, min_score, as_of);
        let pruned = eligible.len() - survivors.len();
        tracing::debug!(pruned, remaining = survivors.len(), min_score, "prefilter applied");

        let score = |candidate: &&Actor| self.score_indexed(source, candidate, profile, &index, as_of);
        let mut matches: Vec<Match> = if self.options.parallel {
            survivors.par_iter().map(score).collect()
        } else {
            survivors.iter().map(score).collect()
        };
        let scored = matches.len();

        matches.retain(|m| m.score >= min_score);
        matches.sort_by(Match::rank_cmp);
        matches.truncate(options.top_k);
        tracing::debug!(scored, returned = matches.len(), "batch ranked");

        Ok(BatchOutcome {
            matches,
            population: population.len(),
            eligible: eligible.len(),
            pruned,
            scored,
        })
    }

    /// Score a pair against a prebuilt index. Never fails: missing or
    /// mismatched bundles become "no comparable data" contributions.
    pub fn score_indexed(
        &self,
        source: &Actor,
        candidate: &Actor,
        profile: &WeightProfile,
        index: &BatchIndex,
        as_of: DateTime<Utc>,
    ) -> Match {
        let mut contributions: Vec<Contribution> = profile
            .signals
            .iter()
            .map(|(signal, spec)| self.contribution(signal, spec, source, candidate, index, as_of))
            .collect();
        contributions.sort_by(Contribution::rank_cmp);

        let (weighted, weight_sum) = contributions
            .iter()
            .filter(|c| c.applied)
            .fold((0.0, 0.0), |(s, w), c| (s + c.weighted, w + c.weight));
        let (score, status) = if weight_sum > 0.0 {
            (clamp_unit(weighted / weight_sum), MatchStatus::Scored)
        } else {
            (0.0, MatchStatus::NoSignal)
        };

        tracing::trace!(
            source = %source.id,
            candidate = %candidate.id,
            score,
            ?status,
            "scored pair"
        );

        Match {
            id: match_id(&profile.name, &source.id, &candidate.id, as_of),
            source_id: source.id.clone(),
            candidate_id: candidate.id.clone(),
            profile: profile.name.clone(),
            score,
            status,
            weight_sum,
            contributions,
            scored_at: as_of,
        }
    }

    fn contribution(
        &self,
        signal: &str,
        spec: &SignalSpec,
        source: &Actor,
        candidate: &Actor,
        index: &BatchIndex,
        as_of: DateTime<Utc>,
    ) -> Contribution {
        let Some((left, right)) = comparable_pair(signal, spec, source, candidate) else {
            return Contribution::not_comparable(signal, spec.metric);
        };
        let numeric_stats = index.numeric_stats(signal);
        if spec.metric == MetricKind::Numeric
            && numeric_stats.is_none()
            && spec
                .params
                .numeric_mode()
                .needs_population(spec.params.range.is_some())
        {
            return Contribution::not_comparable(signal, spec.metric);
        }
        let input = MetricInput {
            signal,
            params: &spec.params,
            left_id: &source.id,
            right_id: &candidate.id,
            as_of,
            text_index: index.text_index(signal),
            numeric_stats,
        };
        match self.registry.evaluate(spec.metric, left, right, &input) {
            Some(sim) => {
                let reason = reasons::sentence(signal, spec.metric, &sim);
                Contribution::applied(signal, spec.metric, sim.value, spec.weight, sim.evidence, reason)
            }
            None => Contribution::not_comparable(signal, spec.metric),
        }
    }
}
