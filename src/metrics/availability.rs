//! Overlap of declared availability windows.

use chrono::{DateTime, Utc};

use crate::model::{SignalValue, TimeWindow};

use super::{MetricInput, Similarity};

/// Sort and union windows, dropping those with non-positive duration.
pub fn merge_windows(windows: &[TimeWindow]) -> Vec<TimeWindow> {
    let mut valid: Vec<TimeWindow> = windows.iter().copied().filter(TimeWindow::is_valid).collect();
    valid.sort_by_key(|w| (w.start, w.end));

    let mut merged: Vec<TimeWindow> = Vec::with_capacity(valid.len());
    for window in valid {
        match merged.last_mut() {
            Some(last) if window.start <= last.end => {
                if window.end > last.end {
                    last.end = window.end;
                }
            }
            _ => merged.push(window),
        }
    }
    merged
}

fn total_seconds(windows: &[TimeWindow]) -> i64 {
    windows.iter().map(|w| (w.end - w.start).num_seconds()).sum()
}

/// Overlapping seconds between two merged, sorted window lists.
fn overlap_seconds(a: &[TimeWindow], b: &[TimeWindow]) -> i64 {
    let (mut i, mut j) = (0, 0);
    let mut total = 0;
    while i < a.len() && j < b.len() {
        let start: DateTime<Utc> = a[i].start.max(b[j].start);
        let end: DateTime<Utc> = a[i].end.min(b[j].end);
        if end > start {
            total += (end - start).num_seconds();
        }
        if a[i].end <= b[j].end {
            i += 1;
        } else {
            j += 1;
        }
    }
    total
}

/// Overlapping duration divided by the shorter side's total availability.
pub fn availability_overlap(a: &[TimeWindow], b: &[TimeWindow]) -> Similarity {
    let a = merge_windows(a);
    let b = merge_windows(b);
    let shorter = total_seconds(&a).min(total_seconds(&b));
    if shorter <= 0 {
        return Similarity::zero("no declared availability");
    }
    let overlap = overlap_seconds(&a, &b);
    let hours = overlap as f64 / 3600.0;
    Similarity::new(
        overlap as f64 / shorter as f64,
        format!("{hours:.1}h of overlapping availability"),
    )
    .with_evidence(vec![format!("{hours:.1}")])
}

pub(super) fn evaluate(
    left: &SignalValue,
    right: &SignalValue,
    _input: &MetricInput<'_>,
) -> Option<Similarity> {
    match (left, right) {
        (SignalValue::Availability(a), SignalValue::Availability(b)) => {
            Some(availability_overlap(a, b))
        }
        _ => None,
    }
}
