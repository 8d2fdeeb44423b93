//! Temporal proximity between two calendar dates.

use chrono::NaiveDate;

use crate::model::SignalValue;

use super::{MetricInput, Similarity};

/// Linear decay with absolute day distance, reaching 0 at `horizon_days`.
///
/// A non-positive or non-finite horizon only credits identical dates.
pub fn date_proximity(a: NaiveDate, b: NaiveDate, horizon_days: f64) -> Similarity {
    let days = (a - b).num_days().unsigned_abs();
    let value = if horizon_days.is_finite() && horizon_days > 0.0 {
        1.0 - (days as f64 / horizon_days)
    } else if days == 0 {
        1.0
    } else {
        0.0
    };
    let reason = match days {
        0 => "same day".to_string(),
        1 => "1 day apart".to_string(),
        n => format!("{n} days apart"),
    };
    Similarity::new(value, reason).with_evidence(vec![days.to_string()])
}

pub(super) fn evaluate(
    left: &SignalValue,
    right: &SignalValue,
    input: &MetricInput<'_>,
) -> Option<Similarity> {
    match (left, right) {
        (SignalValue::Date(a), SignalValue::Date(b)) => {
            Some(date_proximity(*a, *b, input.params.horizon_days()))
        }
        _ => None,
    }
}
