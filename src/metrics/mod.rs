//! Metrics engine: pure, stateless similarity functions.
//!
//! One submodule per signal family. Every function is total and
//! deterministic: degenerate or malformed input resolves to the family's
//! neutral value instead of an error, and every value is clamped to [0, 1].
//!
//! The [`MetricRegistry`] maps each [`MetricKind`] to an adapter that
//! unpacks the [`SignalValue`] variants the family accepts. Adding a family
//! means adding a variant, a function and one registration line; the scoring
//! engine's aggregation never changes.

pub mod availability;
pub mod bipartite;
pub mod contextual;
pub mod numeric;
pub mod params;
pub mod recency;
pub mod sets;
pub mod strings;
pub mod temporal;
pub mod text;

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::SignalValue;

pub use numeric::{NumericMode, NumericStats};
pub use params::SignalParams;
pub use text::{Corpus, TextIndex};

/// Output of a single similarity computation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Similarity {
    /// Similarity in [0, 1]; 1 means identical or maximally compatible.
    pub value: f64,
    /// Items explaining the value (shared tags, covered needs, ...).
    pub evidence: Vec<String>,
    /// Short human-readable reason.
    pub reason: String,
}

impl Similarity {
    pub fn new(value: f64, reason: impl Into<String>) -> Self {
        Self {
            value: crate::model::clamp_unit(value),
            evidence: Vec::new(),
            reason: reason.into(),
        }
    }

    pub fn zero(reason: impl Into<String>) -> Self {
        Self::new(0.0, reason)
    }

    #[must_use]
    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = evidence;
        self
    }
}

/// The similarity algorithms known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Temporal,
    Jaccard,
    Cosine,
    Numeric,
    EditDistance,
    Ngram,
    Tfidf,
    Bipartite,
    Complement,
    Recency,
    Availability,
}

impl MetricKind {
    pub const fn all() -> &'static [Self] {
        &[
            Self::Temporal,
            Self::Jaccard,
            Self::Cosine,
            Self::Numeric,
            Self::EditDistance,
            Self::Ngram,
            Self::Tfidf,
            Self::Bipartite,
            Self::Complement,
            Self::Recency,
            Self::Availability,
        ]
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Temporal => "temporal",
            Self::Jaccard => "jaccard",
            Self::Cosine => "cosine",
            Self::Numeric => "numeric",
            Self::EditDistance => "edit_distance",
            Self::Ngram => "ngram",
            Self::Tfidf => "tfidf",
            Self::Bipartite => "bipartite",
            Self::Complement => "complement",
            Self::Recency => "recency",
            Self::Availability => "availability",
        }
    }

    /// Whether this metric accepts the given signal variant.
    pub const fn accepts(&self, value: &SignalValue) -> bool {
        matches!(
            (self, value),
            (Self::Temporal, SignalValue::Date(_))
                | (Self::Jaccard, SignalValue::Tags(_))
                | (Self::Cosine, SignalValue::Tags(_) | SignalValue::TagCounts(_))
                | (Self::Numeric, SignalValue::Scalar(_))
                | (Self::EditDistance | Self::Ngram, SignalValue::Label(_))
                | (Self::Tfidf, SignalValue::Text(_))
                | (Self::Bipartite, SignalValue::Exchange { .. })
                | (Self::Complement, SignalValue::Category(_))
                | (Self::Recency, SignalValue::Events(_))
                | (Self::Availability, SignalValue::Availability(_))
        )
    }

    /// Metrics cheap enough to evaluate exactly during prefiltering.
    ///
    /// Numeric is only cheap when it needs no population statistics, which
    /// the prefilter decides from the signal parameters.
    pub const fn is_cheap(&self) -> bool {
        matches!(
            self,
            Self::Temporal | Self::Jaccard | Self::Bipartite | Self::Complement | Self::EditDistance
        )
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a metric may consult besides the two signal values.
#[derive(Debug, Clone, Copy)]
pub struct MetricInput<'a> {
    pub signal: &'a str,
    pub params: &'a SignalParams,
    pub left_id: &'a str,
    pub right_id: &'a str,
    /// Reference instant for recency decay.
    pub as_of: DateTime<Utc>,
    /// Batch text index for this signal, when built.
    pub text_index: Option<&'a TextIndex>,
    /// Batch population statistics for this signal, when built.
    pub numeric_stats: Option<&'a NumericStats>,
}

/// Adapter from a pair of signal values to a similarity.
///
/// Returns `None` when either value is not a variant the metric accepts.
pub type MetricFn = fn(&SignalValue, &SignalValue, &MetricInput<'_>) -> Option<Similarity>;

/// Dispatch table from metric kind to implementation.
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    metrics: HashMap<MetricKind, MetricFn>,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl MetricRegistry {
    /// An empty registry. Every evaluation returns `None` until metrics are
    /// registered.
    pub fn empty() -> Self {
        Self {
            metrics: HashMap::new(),
        }
    }

    /// Registry with every built-in signal family.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(MetricKind::Temporal, temporal::evaluate);
        registry.register(MetricKind::Jaccard, sets::evaluate_jaccard);
        registry.register(MetricKind::Cosine, sets::evaluate_cosine);
        registry.register(MetricKind::Numeric, numeric::evaluate);
        registry.register(MetricKind::EditDistance, strings::evaluate_edit_distance);
        registry.register(MetricKind::Ngram, strings::evaluate_ngram);
        registry.register(MetricKind::Tfidf, text::evaluate);
        registry.register(MetricKind::Bipartite, bipartite::evaluate);
        registry.register(MetricKind::Complement, contextual::evaluate);
        registry.register(MetricKind::Recency, recency::evaluate);
        registry.register(MetricKind::Availability, availability::evaluate);
        registry
    }

    /// Register (or replace) the implementation for a metric.
    pub fn register(&mut self, kind: MetricKind, metric: MetricFn) {
        self.metrics.insert(kind, metric);
    }

    pub fn contains(&self, kind: MetricKind) -> bool {
        self.metrics.contains_key(&kind)
    }

    /// Evaluate a metric. `None` means the pair is not comparable under it.
    pub fn evaluate(
        &self,
        kind: MetricKind,
        left: &SignalValue,
        right: &SignalValue,
        input: &MetricInput<'_>,
    ) -> Option<Similarity> {
        let metric = self.metrics.get(&kind)?;
        metric(left, right, input).map(|mut sim| {
            sim.value = crate::model::clamp_unit(sim.value);
            sim
        })
    }
}
