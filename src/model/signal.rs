use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A typed signal bundle. One variant per signal family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SignalValue {
    /// A calendar date (e.g. arrival day, founding date).
    Date(NaiveDate),
    /// An unordered tag set.
    Tags(Vec<String>),
    /// Tag frequencies, for when repetition carries weight.
    TagCounts(BTreeMap<String, f64>),
    /// A single numeric trait.
    Scalar(f64),
    /// A short string such as a company or job title.
    Label(String),
    /// A free-text blob (bio, pitch, abstract).
    Text(String),
    /// Declared capabilities and needs.
    Exchange {
        #[serde(default)]
        capabilities: Vec<String>,
        #[serde(default)]
        needs: Vec<String>,
    },
    /// A categorical attribute (stage, role, intent).
    Category(String),
    /// Co-location / badge-scan events with other actors.
    Events(Vec<ProximityEvent>),
    /// Declared availability windows.
    Availability(Vec<TimeWindow>),
}

impl SignalValue {
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Tags(tags.into_iter().map(Into::into).collect())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self::Label(label.into())
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self::Category(category.into())
    }

    pub fn exchange<C, N, S>(capabilities: C, needs: N) -> Self
    where
        C: IntoIterator<Item = S>,
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exchange {
            capabilities: capabilities.into_iter().map(Into::into).collect(),
            needs: needs.into_iter().map(Into::into).collect(),
        }
    }

    /// Family name, as used in diagnostics.
    pub const fn family(&self) -> &'static str {
        match self {
            Self::Date(_) => "date",
            Self::Tags(_) => "tags",
            Self::TagCounts(_) => "tag_counts",
            Self::Scalar(_) => "scalar",
            Self::Label(_) => "label",
            Self::Text(_) => "text",
            Self::Exchange { .. } => "exchange",
            Self::Category(_) => "category",
            Self::Events(_) => "events",
            Self::Availability(_) => "availability",
        }
    }
}

/// A timestamped proximity event observed by one actor about another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProximityEvent {
    /// The other actor involved.
    pub peer: String,
    pub at: DateTime<Utc>,
}

impl ProximityEvent {
    pub fn new(peer: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            peer: peer.into(),
            at,
        }
    }
}

/// A half-open availability window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Windows with a non-positive duration carry no availability.
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }
}
