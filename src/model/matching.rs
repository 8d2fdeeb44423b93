use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::MetricKind;

/// Reason recorded for signals that could not be compared for a pair.
pub const NO_COMPARABLE_DATA: &str = "no comparable data";

/// Whether a match was computed from at least one comparable signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// At least one signal was comparable; `score` is meaningful.
    Scored,
    /// No signal in the profile was comparable (weight-sum 0).
    NoSignal,
}

/// Per-signal decomposition of a pairwise score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Signal name as declared in the weight profile.
    pub signal: String,
    pub metric: MetricKind,
    /// Raw similarity in [0, 1].
    pub raw: f64,
    /// Weight actually applied; 0 when the signal was not comparable.
    pub weight: f64,
    /// `raw * weight`.
    pub weighted: f64,
    pub applied: bool,
    /// Items that explain the value (shared tags, matched needs, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<String>,
    /// Short reason string.
    pub reason: String,
}

impl Contribution {
    /// A contribution for a signal that both actors carry.
    pub fn applied(
        signal: impl Into<String>,
        metric: MetricKind,
        raw: f64,
        weight: f64,
        evidence: Vec<String>,
        reason: impl Into<String>,
    ) -> Self {
        let raw = clamp_unit(raw);
        Self {
            signal: signal.into(),
            metric,
            raw,
            weight,
            weighted: raw * weight,
            applied: true,
            evidence,
            reason: reason.into(),
        }
    }

    /// A contribution for a signal missing (or mistyped) on either side.
    pub fn not_comparable(signal: impl Into<String>, metric: MetricKind) -> Self {
        Self {
            signal: signal.into(),
            metric,
            raw: 0.0,
            weight: 0.0,
            weighted: 0.0,
            applied: false,
            evidence: Vec::new(),
            reason: NO_COMPARABLE_DATA.to_string(),
        }
    }

    /// Ordering used inside a match: weighted value descending, applied
    /// before not-applied, then signal name.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .weighted
            .total_cmp(&self.weighted)
            .then_with(|| other.applied.cmp(&self.applied))
            .then_with(|| self.signal.cmp(&other.signal))
    }
}

/// The scored, explainable result of comparing one ordered actor pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Content hash of (profile, source, candidate, timestamp).
    pub id: String,
    pub source_id: String,
    pub candidate_id: String,
    pub profile: String,
    /// Total score in [0, 1]; 0 for no-signal matches.
    pub score: f64,
    pub status: MatchStatus,
    /// Sum of weights actually applied.
    pub weight_sum: f64,
    /// Sorted by weighted contribution, descending.
    pub contributions: Vec<Contribution>,
    pub scored_at: DateTime<Utc>,
}

impl Match {
    pub fn is_no_signal(&self) -> bool {
        self.status == MatchStatus::NoSignal
    }

    /// Recompute the total from the contributions alone.
    pub fn recomputed_score(&self) -> f64 {
        let (weighted, weights) = self
            .contributions
            .iter()
            .fold((0.0, 0.0), |(s, w), c| (s + c.weighted, w + c.weight));
        if weights > 0.0 {
            clamp_unit(weighted / weights)
        } else {
            0.0
        }
    }

    /// The `n` highest applied contributions with a positive weighted value.
    pub fn top_contributions(&self, n: usize) -> impl Iterator<Item = &Contribution> {
        self.contributions
            .iter()
            .filter(|c| c.applied && c.weighted > 0.0)
            .take(n)
    }

    /// Ranking order for batch results: score descending, scored before
    /// no-signal, then source id and candidate id.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| status_rank(self.status).cmp(&status_rank(other.status)))
            .then_with(|| self.source_id.cmp(&other.source_id))
            .then_with(|| self.candidate_id.cmp(&other.candidate_id))
    }
}

const fn status_rank(status: MatchStatus) -> u8 {
    match status {
        MatchStatus::Scored => 0,
        MatchStatus::NoSignal => 1,
    }
}

/// Clamp to [0, 1], mapping NaN to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
