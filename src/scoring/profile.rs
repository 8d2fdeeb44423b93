//! Weight profiles: named, immutable mappings from signal name to metric,
//! weight and parameters.
//!
//! Profiles are validated when they are loaded, so scoring never sees a
//! negative weight or a malformed parameter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RapportError, Result, suggest_similar};
use crate::metrics::{MetricKind, NumericMode, SignalParams};

/// Upper bound on any single signal weight.
pub const MAX_WEIGHT: f64 = 1_000.0;

/// Name of the generic fallback profile.
pub const DEFAULT_PROFILE: &str = "default";

/// How one signal is compared and weighted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalSpec {
    pub metric: MetricKind,
    pub weight: f64,
    #[serde(default)]
    pub params: SignalParams,
}

impl SignalSpec {
    pub fn new(metric: MetricKind, weight: f64) -> Self {
        Self {
            metric,
            weight,
            params: SignalParams::default(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: SignalParams) -> Self {
        self.params = params;
        self
    }
}

/// A named weight profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightProfile {
    /// Filled from the table key when loaded from configuration.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub signals: BTreeMap<String, SignalSpec>,
    /// Minimum total score for a candidate to be returned by a batch.
    #[serde(default)]
    pub min_score: f64,
    /// When non-empty, only candidates with one of these personas are eligible.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidate_personas: Vec<String>,
    /// Only candidates in the source's region are eligible.
    #[serde(default)]
    pub same_region: bool,
}

impl WeightProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            signals: BTreeMap::new(),
            min_score: 0.0,
            candidate_personas: Vec::new(),
            same_region: false,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_signal(mut self, name: impl Into<String>, spec: SignalSpec) -> Self {
        self.signals.insert(name.into(), spec);
        self
    }

    #[must_use]
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    #[must_use]
    pub fn with_candidate_personas<I, S>(mut self, personas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidate_personas = personas.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_same_region(mut self, same_region: bool) -> Self {
        self.same_region = same_region;
        self
    }

    /// Signal names scored with the given metric.
    pub fn signals_using(&self, metric: MetricKind) -> Vec<&str> {
        self.signals
            .iter()
            .filter(|(_, spec)| spec.metric == metric)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Reject negative, non-finite or oversized weights and malformed
    /// parameters.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| RapportError::InvalidProfile {
            profile: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("profile name is empty".to_string()));
        }
        if self.signals.is_empty() {
            return Err(invalid("profile declares no signals".to_string()));
        }
        if !self.min_score.is_finite() || !(0.0..=1.0).contains(&self.min_score) {
            return Err(invalid(format!(
                "min_score must be within [0, 1], got {}",
                self.min_score
            )));
        }
        for (signal, spec) in &self.signals {
            if signal.trim().is_empty() {
                return Err(invalid("signal name is empty".to_string()));
            }
            if !spec.weight.is_finite() || spec.weight < 0.0 {
                return Err(invalid(format!(
                    "signal '{signal}' has invalid weight {}",
                    spec.weight
                )));
            }
            if spec.weight > MAX_WEIGHT {
                return Err(invalid(format!(
                    "signal '{signal}' weight {} exceeds maximum {MAX_WEIGHT}",
                    spec.weight
                )));
            }
            spec.params
                .validate()
                .map_err(|reason| invalid(format!("signal '{signal}': {reason}")))?;
        }
        Ok(())
    }
}

/// Named profiles available to a request.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, WeightProfile>,
}

impl ProfileRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry seeded with the built-in persona profiles.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for profile in builtin_profiles() {
            registry.profiles.insert(profile.name.clone(), profile);
        }
        registry
    }

    /// Validate and add a profile, replacing any profile of the same name.
    pub fn insert(&mut self, profile: WeightProfile) -> Result<()> {
        profile.validate()?;
        tracing::debug!(profile = %profile.name, signals = profile.signals.len(), "registered profile");
        self.profiles.insert(profile.name.clone(), profile);
        Ok(())
    }

    /// Look up a profile by name, failing with suggestions when unknown.
    pub fn get(&self, name: &str) -> Result<&WeightProfile> {
        self.profiles.get(name).ok_or_else(|| {
            let names: Vec<&str> = self.names().collect();
            RapportError::ProfileNotFound {
                name: name.to_string(),
                suggestions: suggest_similar(name, &names, 3),
            }
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeightProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Built-in profiles for the common personas and a generic default.
///
/// Signal names follow the conventional actor schema: `interests` (tags),
/// `topics` (tag counts), `bio` (text), `offer` (exchange), `stage`
/// (category), `met` (events), `availability`, `arrival` (date),
/// `company` (label) and `team_size` (scalar).
pub fn builtin_profiles() -> Vec<WeightProfile> {
    use MetricKind::{
        Availability, Bipartite, Complement, Cosine, Jaccard, Ngram, Numeric, Recency, Temporal,
        Tfidf,
    };

    let ratio = SignalParams {
        numeric: Some(NumericMode::Ratio),
        ..SignalParams::default()
    };

    vec![
        WeightProfile::new(DEFAULT_PROFILE)
            .with_description("Balanced profile for any persona")
            .with_signal("interests", SignalSpec::new(Jaccard, 1.0))
            .with_signal("bio", SignalSpec::new(Tfidf, 0.8))
            .with_signal("offer", SignalSpec::new(Bipartite, 1.2))
            .with_signal("stage", SignalSpec::new(Complement, 0.6))
            .with_signal("met", SignalSpec::new(Recency, 0.5))
            .with_signal("availability", SignalSpec::new(Availability, 0.7))
            .with_signal("arrival", SignalSpec::new(Temporal, 0.3)),
        WeightProfile::new("developer")
            .with_description("Developers looking for publishers, investors and collaborators")
            .with_signal("interests", SignalSpec::new(Jaccard, 1.0))
            .with_signal("topics", SignalSpec::new(Cosine, 0.6))
            .with_signal("bio", SignalSpec::new(Tfidf, 0.6))
            .with_signal("offer", SignalSpec::new(Bipartite, 1.5))
            .with_signal("stage", SignalSpec::new(Complement, 1.0))
            .with_signal("availability", SignalSpec::new(Availability, 0.5))
            .with_signal("met", SignalSpec::new(Recency, 0.4)),
        WeightProfile::new("publisher")
            .with_description("Publishers scouting developer studios")
            .with_candidate_personas(["developer"])
            .with_signal("interests", SignalSpec::new(Jaccard, 1.2))
            .with_signal("offer", SignalSpec::new(Bipartite, 1.5))
            .with_signal("stage", SignalSpec::new(Complement, 1.0))
            .with_signal("bio", SignalSpec::new(Tfidf, 0.8))
            .with_signal("company", SignalSpec::new(Ngram, 0.2))
            .with_signal("availability", SignalSpec::new(Availability, 0.4)),
        WeightProfile::new("investor")
            .with_description("Investors meeting early-stage companies")
            .with_signal("stage", SignalSpec::new(Complement, 2.0))
            .with_signal("offer", SignalSpec::new(Bipartite, 1.5))
            .with_signal("interests", SignalSpec::new(Jaccard, 0.8))
            .with_signal("bio", SignalSpec::new(Tfidf, 0.8))
            .with_signal("team_size", SignalSpec::new(Numeric, 0.4).with_params(ratio))
            .with_signal("availability", SignalSpec::new(Availability, 0.5)),
        WeightProfile::new("attendee")
            .with_description("Attendees networking on shared interests")
            .with_signal("interests", SignalSpec::new(Jaccard, 1.2))
            .with_signal("bio", SignalSpec::new(Tfidf, 1.0))
            .with_signal("availability", SignalSpec::new(Availability, 1.0))
            .with_signal("met", SignalSpec::new(Recency, 0.8))
            .with_signal("arrival", SignalSpec::new(Temporal, 0.4)),
    ]
}
