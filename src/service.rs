//! Request-level operations: resolve ids and profile names, then score.
//!
//! Unknown profiles and actors fail the whole request before any pair is
//! scored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RapportError, Result};
use crate::model::Actor;
use crate::scoring::{
    BatchOptions, ExplainedMatch, FeedbackIntake, FeedbackRecord, FeedbackSubmission, MatchEngine,
    ProfileRegistry, WeightProfile, DEFAULT_PROFILE,
};
use crate::store::{ActorSupply, MatchSink, PopulationFilter};

/// Default number of batch results.
pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRequest {
    pub source_id: String,
    pub candidate_id: String,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

impl PairRequest {
    pub fn new(source_id: impl Into<String>, candidate_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            candidate_id: candidate_id.into(),
            profile: None,
            as_of: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub source_id: String,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub min_score: Option<f64>,
    /// Restrict the population to these personas.
    #[serde(default)]
    pub personas: Vec<String>,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

impl BatchRequest {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            profile: None,
            top_k: None,
            min_score: None,
            personas: Vec::new(),
            as_of: None,
        }
    }
}

/// Batch result as handed to a match sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub source_id: String,
    pub profile: String,
    pub as_of: DateTime<Utc>,
    pub population: usize,
    pub eligible: usize,
    pub pruned: usize,
    pub scored: usize,
    pub matches: Vec<ExplainedMatch>,
}

/// Front door for pair, batch and feedback requests.
pub struct MatchService<S> {
    supply: S,
    profiles: ProfileRegistry,
    engine: MatchEngine,
    default_profile: String,
    default_top_k: usize,
    feedback: Option<FeedbackIntake>,
}

impl<S: ActorSupply> MatchService<S> {
    pub fn new(supply: S, profiles: ProfileRegistry, engine: MatchEngine) -> Self {
        Self {
            supply,
            profiles,
            engine,
            default_profile: DEFAULT_PROFILE.to_string(),
            default_top_k: DEFAULT_TOP_K,
            feedback: None,
        }
    }

    #[must_use]
    pub fn with_default_profile(mut self, name: impl Into<String>) -> Self {
        self.default_profile = name.into();
        self
    }

    #[must_use]
    pub const fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    #[must_use]
    pub fn with_feedback(mut self, intake: FeedbackIntake) -> Self {
        self.feedback = Some(intake);
        self
    }

    pub const fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    pub const fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    fn profile(&self, name: Option<&str>) -> Result<&WeightProfile> {
        self.profiles.get(name.unwrap_or(&self.default_profile))
    }

    fn actor(&self, id: &str) -> Result<Actor> {
        self.supply
            .actor(id)
            .ok_or_else(|| RapportError::ActorNotFound(id.to_string()))
    }

    /// Score one ordered pair. Text and numeric signals are normalized
    /// against the consenting population.
    pub fn pair(&self, request: &PairRequest) -> Result<ExplainedMatch> {
        let profile = self.profile(request.profile.as_deref())?;
        let source = self.actor(&request.source_id)?;
        let candidate = self.actor(&request.candidate_id)?;
        let as_of = request.as_of.unwrap_or_else(Utc::now);

        let population = self.supply.population(&PopulationFilter::consenting());
        let matched =
            self.engine
                .score_pair_within(&source, &candidate, &population, profile, as_of)?;
        Ok(ExplainedMatch::new(matched, self.engine.options().max_reasons))
    }

    /// Rank the consenting population against a source actor.
    pub fn batch(&self, request: &BatchRequest) -> Result<BatchReport> {
        let profile = self.profile(request.profile.as_deref())?;
        let source = self.actor(&request.source_id)?;
        let as_of = request.as_of.unwrap_or_else(Utc::now);

        let mut options = BatchOptions::new(request.top_k.unwrap_or(self.default_top_k), as_of);
        options.min_score = request.min_score;

        let filter = PopulationFilter::consenting().with_personas(request.personas.iter().cloned());
        let population = self.supply.population(&filter);
        tracing::debug!(
            source = %source.id,
            profile = %profile.name,
            population = population.len(),
            "batch requested"
        );

        let outcome = self.engine.batch(&source, &population, profile, &options)?;
        let max_reasons = self.engine.options().max_reasons;
        Ok(BatchReport {
            source_id: source.id,
            profile: profile.name.clone(),
            as_of,
            population: outcome.population,
            eligible: outcome.eligible,
            pruned: outcome.pruned,
            scored: outcome.scored,
            matches: outcome
                .matches
                .into_iter()
                .map(|m| ExplainedMatch::new(m, max_reasons))
                .collect(),
        })
    }

    /// Run a batch and hand its matches to `sink` in rank order.
    pub fn batch_into(&self, request: &BatchRequest, sink: &mut dyn MatchSink) -> Result<BatchReport> {
        let report = self.batch(request)?;
        sink.accept(&report.matches)?;
        Ok(report)
    }

    /// Validate and forward feedback on a match.
    pub fn feedback(
        &self,
        submission: FeedbackSubmission,
        now: DateTime<Utc>,
    ) -> Result<FeedbackRecord> {
        let intake = self.feedback.as_ref().ok_or_else(|| {
            RapportError::InvalidRequest("no feedback sink configured".to_string())
        })?;
        intake.submit(submission, now)
    }
}
