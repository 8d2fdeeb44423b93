//! Signal-specific parameters carried by a weight profile.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::numeric::NumericMode;

/// Default horizon at which temporal proximity reaches 0.
pub const DEFAULT_HORIZON: Duration = Duration::from_secs(180 * 86_400);
/// Default half-life of the recency decay.
pub const DEFAULT_HALF_LIFE: Duration = Duration::from_secs(7 * 86_400);
/// Default character n-gram size.
pub const DEFAULT_NGRAM: usize = 3;

const MAX_NGRAM: usize = 16;

/// Optional per-signal parameters. Unset fields fall back to the family
/// defaults; unknown keys are rejected when a profile is parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalParams {
    /// Temporal proximity horizon (humantime, e.g. `"180d"`).
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub horizon: Option<Duration>,
    /// Recency half-life (humantime, e.g. `"7days"`).
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub half_life: Option<Duration>,
    /// Character n-gram size for the n-gram string metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ngram: Option<usize>,
    /// Numeric comparison mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericMode>,
    /// Declared `[min, max]` range for min-max numeric comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    /// Extra complementary category pairs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub complements: Vec<[String; 2]>,
}

impl SignalParams {
    pub fn horizon_days(&self) -> f64 {
        duration_days(self.horizon.unwrap_or(DEFAULT_HORIZON))
    }

    pub fn half_life_days(&self) -> f64 {
        duration_days(self.half_life.unwrap_or(DEFAULT_HALF_LIFE))
    }

    pub fn ngram_size(&self) -> usize {
        self.ngram.unwrap_or(DEFAULT_NGRAM)
    }

    pub fn numeric_mode(&self) -> NumericMode {
        self.numeric.unwrap_or_default()
    }

    /// Check the parameters, returning a description of the first problem.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(horizon) = self.horizon {
            if horizon.is_zero() {
                return Err("horizon must be greater than zero".to_string());
            }
        }
        if let Some(half_life) = self.half_life {
            if half_life.is_zero() {
                return Err("half_life must be greater than zero".to_string());
            }
        }
        if let Some(n) = self.ngram {
            if n == 0 || n > MAX_NGRAM {
                return Err(format!("ngram must be between 1 and {MAX_NGRAM}, got {n}"));
            }
        }
        if let Some([min, max]) = self.range {
            if !min.is_finite() || !max.is_finite() {
                return Err("range bounds must be finite".to_string());
            }
            if min > max {
                return Err(format!("range min {min} exceeds max {max}"));
            }
        }
        for [a, b] in &self.complements {
            if a.trim().is_empty() || b.trim().is_empty() {
                return Err("complement pairs must name two categories".to_string());
            }
        }
        Ok(())
    }
}

fn duration_days(duration: Duration) -> f64 {
    duration.as_secs_f64() / 86_400.0
}
