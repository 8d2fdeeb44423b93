//! Actor supply and match sinks.
//!
//! The engine never reads or writes storage itself: actors are fetched
//! before a batch starts and results are handed to a [`MatchSink`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RapportError, Result};
use crate::model::Actor;
use crate::scoring::ExplainedMatch;

/// Narrows a population request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationFilter {
    /// Keep actors with any of these personas (case-insensitive).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub personas: Vec<String>,
    /// Keep only consenting actors.
    #[serde(default)]
    pub consent_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl PopulationFilter {
    pub fn consenting() -> Self {
        Self {
            consent_only: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_personas<I, S>(mut self, personas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.personas = personas.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn matches(&self, actor: &Actor) -> bool {
        if self.consent_only && !actor.consent {
            return false;
        }
        if !self.personas.is_empty() && !self.personas.iter().any(|p| actor.has_persona(p)) {
            return false;
        }
        match (&self.region, &actor.region) {
            (None, _) => true,
            (Some(wanted), Some(region)) => region.trim().eq_ignore_ascii_case(wanted.trim()),
            (Some(_), None) => false,
        }
    }
}

/// Read-only access to normalized actor records.
pub trait ActorSupply: Send + Sync {
    fn actor(&self, id: &str) -> Option<Actor>;

    /// Actors passing `filter`, ordered by id.
    fn population(&self, filter: &PopulationFilter) -> Vec<Actor>;
}

/// Actors held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActorStore {
    actors: BTreeMap<String, Actor>,
}

impl InMemoryActorStore {
    /// Build a store, rejecting duplicate ids.
    pub fn from_actors<I: IntoIterator<Item = Actor>>(actors: I) -> Result<Self> {
        let mut map = BTreeMap::new();
        for actor in actors {
            if actor.id.trim().is_empty() {
                return Err(RapportError::InvalidRequest(
                    "actor id must not be empty".to_string(),
                ));
            }
            if map.contains_key(&actor.id) {
                return Err(RapportError::DuplicateActor(actor.id));
            }
            map.insert(actor.id.clone(), actor);
        }
        Ok(Self { actors: map })
    }

    /// Load actors from a `.json` array, `.jsonl` lines, or `.yaml`/`.yml`
    /// sequence.
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let raw = std::fs::read_to_string(path)?;

        let actors: Vec<Actor> = match extension.as_str() {
            "json" => serde_json::from_str(&raw)?,
            "jsonl" => parse_jsonl(&raw),
            "yaml" | "yml" => serde_yaml::from_str(&raw)?,
            _ => return Err(RapportError::UnsupportedFormat(path.display().to_string())),
        };
        tracing::debug!(path = %path.display(), actors = actors.len(), "loaded actors");
        Self::from_actors(actors)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl ActorSupply for InMemoryActorStore {
    fn actor(&self, id: &str) -> Option<Actor> {
        self.actors.get(id).cloned()
    }

    fn population(&self, filter: &PopulationFilter) -> Vec<Actor> {
        self.actors
            .values()
            .filter(|actor| filter.matches(actor))
            .cloned()
            .collect()
    }
}

/// One actor per line. Blank lines are ignored; malformed lines are
/// logged and skipped.
fn parse_jsonl(raw: &str) -> Vec<Actor> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(number, line)| match serde_json::from_str(line) {
            Ok(actor) => Some(actor),
            Err(err) => {
                tracing::warn!(line = number + 1, error = %err, "skipping malformed actor record");
                None
            }
        })
        .collect()
}

/// Consumer of produced matches.
pub trait MatchSink {
    fn accept(&mut self, matches: &[ExplainedMatch]) -> Result<()>;
}

/// Collects matches in memory.
#[derive(Debug, Default)]
pub struct VecMatchSink {
    matches: Vec<ExplainedMatch>,
}

impl VecMatchSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matches(&self) -> &[ExplainedMatch] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<ExplainedMatch> {
        self.matches
    }
}

impl MatchSink for VecMatchSink {
    fn accept(&mut self, matches: &[ExplainedMatch]) -> Result<()> {
        self.matches.extend_from_slice(matches);
        Ok(())
    }
}
