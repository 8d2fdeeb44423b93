use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::signal::SignalValue;

/// A matchable profile: an individual attendee or an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Stable identifier, unique within a store.
    pub id: String,
    /// Persona used for profile selection and eligibility (e.g. "developer").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    /// Coarse geographic bucket (e.g. "eu-west").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Whether this actor may be scored or appear as a candidate.
    #[serde(default)]
    pub consent: bool,
    /// Signal bundles keyed by signal name.
    #[serde(default)]
    pub signals: BTreeMap<String, SignalValue>,
}

impl Actor {
    /// Create a consenting actor with no signals.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            persona: None,
            region: None,
            consent: true,
            signals: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub const fn with_consent(mut self, consent: bool) -> Self {
        self.consent = consent;
        self
    }

    /// Attach (or replace) a signal bundle.
    #[must_use]
    pub fn with_signal(mut self, name: impl Into<String>, value: SignalValue) -> Self {
        self.signals.insert(name.into(), value);
        self
    }

    /// Look up a signal bundle by name.
    pub fn signal(&self, name: &str) -> Option<&SignalValue> {
        self.signals.get(name)
    }

    /// Case-insensitive persona check. Actors without a persona never match.
    pub fn has_persona(&self, persona: &str) -> bool {
        self.persona
            .as_deref()
            .is_some_and(|p| p.trim().eq_ignore_ascii_case(persona.trim()))
    }
}
