//! Recency-decayed co-location between a pair of actors.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::model::{ProximityEvent, SignalValue};

use super::{MetricInput, Similarity};

/// Distinct timestamps of events between `a` and `b`, drawn from both
/// actors' event lists.
pub fn shared_events(
    a_id: &str,
    a_events: &[ProximityEvent],
    b_id: &str,
    b_events: &[ProximityEvent],
) -> BTreeSet<DateTime<Utc>> {
    a_events
        .iter()
        .filter(|e| e.peer == b_id)
        .chain(b_events.iter().filter(|e| e.peer == a_id))
        .map(|e| e.at)
        .collect()
}

/// `0.5^(age / half_life)` for the most recent shared event; 0 if none.
///
/// Events after `as_of` count as age 0. A non-positive half-life only
/// credits events at `as_of` itself.
pub fn recency(
    a_id: &str,
    a_events: &[ProximityEvent],
    b_id: &str,
    b_events: &[ProximityEvent],
    as_of: DateTime<Utc>,
    half_life_days: f64,
) -> Similarity {
    let events = shared_events(a_id, a_events, b_id, b_events);
    let Some(latest) = events.last().copied() else {
        return Similarity::zero("never met");
    };

    let age_days = ((as_of - latest).num_seconds().max(0)) as f64 / 86_400.0;
    let value = if half_life_days.is_finite() && half_life_days > 0.0 {
        0.5_f64.powf(age_days / half_life_days)
    } else if age_days == 0.0 {
        1.0
    } else {
        0.0
    };

    let count = events.len();
    let encounters = if count == 1 {
        "1 encounter".to_string()
    } else {
        format!("{count} encounters")
    };
    let reason = match age_days.floor() as u64 {
        0 => format!("met today ({encounters})"),
        1 => format!("last met 1 day ago ({encounters})"),
        days => format!("last met {days} days ago ({encounters})"),
    };
    Similarity::new(value, reason).with_evidence(vec![latest.to_rfc3339()])
}

pub(super) fn evaluate(
    left: &SignalValue,
    right: &SignalValue,
    input: &MetricInput<'_>,
) -> Option<Similarity> {
    match (left, right) {
        (SignalValue::Events(a), SignalValue::Events(b)) => Some(recency(
            input.left_id,
            a,
            input.right_id,
            b,
            input.as_of,
            input.params.half_life_days(),
        )),
        _ => None,
    }
}
