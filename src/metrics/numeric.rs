//! Numeric trait similarity under three comparison profiles.

use serde::{Deserialize, Serialize};

use crate::model::SignalValue;

use super::{MetricInput, Similarity};

/// How two scalars are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericMode {
    /// `exp(-|z_a - z_b|)` using population standard deviation.
    #[default]
    ZScore,
    /// `1 - |a - b| / range`.
    MinMax,
    /// `min / max` of magnitudes.
    Ratio,
}

impl NumericMode {
    /// Modes that need population statistics to be evaluated.
    pub const fn needs_population(&self, has_declared_range: bool) -> bool {
        match self {
            Self::ZScore => true,
            Self::MinMax => !has_declared_range,
            Self::Ratio => false,
        }
    }
}

/// Summary statistics of a scalar signal across a population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl NumericStats {
    /// Compute statistics over the finite values; `None` if there are none.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// `exp(-|z_a - z_b|)`. A zero spread means every value is identical.
pub fn z_score(a: f64, b: f64, std_dev: f64) -> Similarity {
    if !a.is_finite() || !b.is_finite() {
        return Similarity::zero("non-numeric value");
    }
    if !std_dev.is_finite() || std_dev <= 0.0 {
        return Similarity::new(1.0, "no spread in population");
    }
    let distance = (a - b).abs() / std_dev;
    Similarity::new((-distance).exp(), format!("{distance:.2} standard deviations apart"))
}

/// `1 - |a - b| / range`. A zero range treats the values as identical.
pub fn min_max(a: f64, b: f64, range: f64) -> Similarity {
    if !a.is_finite() || !b.is_finite() {
        return Similarity::zero("non-numeric value");
    }
    if !range.is_finite() || range <= 0.0 {
        return Similarity::new(1.0, "zero range");
    }
    let share = (a - b).abs() / range;
    Similarity::new(1.0 - share, format!("{:.0}% of range apart", share.min(1.0) * 100.0))
}

/// Ratio of the smaller to the larger magnitude. Opposite signs score 0.
pub fn ratio(a: f64, b: f64) -> Similarity {
    if !a.is_finite() || !b.is_finite() {
        return Similarity::zero("non-numeric value");
    }
    if a * b < 0.0 {
        return Similarity::zero("opposite signs");
    }
    let (lo, hi) = (a.abs().min(b.abs()), a.abs().max(b.abs()));
    if hi == 0.0 {
        return Similarity::new(1.0, "both zero");
    }
    Similarity::new(lo / hi, format!("ratio {:.2}", lo / hi))
}

/// Compare two scalars under the given mode.
///
/// `stats` supplies the population spread for z-score and the fallback
/// range for min-max; without it the pair itself is the population.
pub fn compare(
    a: f64,
    b: f64,
    mode: NumericMode,
    declared_range: Option<[f64; 2]>,
    stats: Option<&NumericStats>,
) -> Similarity {
    let pair_stats = || NumericStats::from_values([a, b]);
    match mode {
        NumericMode::ZScore => {
            let std_dev = stats
                .copied()
                .or_else(pair_stats)
                .map_or(0.0, |s| s.std_dev);
            z_score(a, b, std_dev)
        }
        NumericMode::MinMax => {
            let range = match declared_range {
                Some([min, max]) => max - min,
                None => stats.copied().or_else(pair_stats).map_or(0.0, |s| s.range()),
            };
            min_max(a, b, range)
        }
        NumericMode::Ratio => ratio(a, b),
    }
}

pub(super) fn evaluate(
    left: &SignalValue,
    right: &SignalValue,
    input: &MetricInput<'_>,
) -> Option<Similarity> {
    match (left, right) {
        (SignalValue::Scalar(a), SignalValue::Scalar(b)) => Some(compare(
            *a,
            *b,
            input.params.numeric_mode(),
            input.params.range,
            input.numeric_stats,
        )),
        _ => None,
    }
}
