//! Short, templated sentences explaining a match.
//!
//! Sentences are rendered once per contribution at scoring time; picking the
//! reasons for a match is a projection over its contributions.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::metrics::{MetricKind, Similarity};
use crate::model::{Match, NO_COMPARABLE_DATA};

/// Upper bound on reasons shown for one match.
pub const MAX_REASONS: usize = 3;

/// Reason used for a scored match where nothing overlapped.
pub const NOTHING_IN_COMMON: &str = "nothing in common";

const MAX_EVIDENCE: usize = 3;

/// Render the sentence for one contribution.
///
/// Zero-valued similarities keep the metric's own reason ("never met",
/// "0 shared of 4").
pub fn sentence(signal: &str, metric: MetricKind, similarity: &Similarity) -> String {
    if similarity.value <= 0.0 {
        return similarity.reason.clone();
    }
    let evidence = evidence_list(&similarity.evidence);
    match metric {
        MetricKind::Jaccard | MetricKind::Cosine if !evidence.is_empty() => {
            format!("shared interest in {evidence}")
        }
        MetricKind::Tfidf if !evidence.is_empty() => {
            format!("similar {signal}: {evidence}")
        }
        MetricKind::Bipartite if !evidence.is_empty() => {
            format!("complementary offer: {evidence}")
        }
        MetricKind::Complement => match similarity.evidence.as_slice() {
            [a, b] => format!("complementary stage/intent ({a} and {b})"),
            _ => "complementary stage/intent".to_string(),
        },
        MetricKind::Recency => format!("recently met, {}", similarity.reason),
        MetricKind::Availability => similarity.reason.clone(),
        MetricKind::Temporal => format!("{signal} dates {}", similarity.reason),
        _ => format!("similar {signal} ({})", similarity.reason),
    }
}

fn evidence_list(evidence: &[String]) -> String {
    evidence.iter().take(MAX_EVIDENCE).join(", ")
}

/// The top reasons for a match, strongest first.
///
/// `max` is clamped to `1..=3`. A match with no positive contribution still
/// yields one reason.
pub fn explain(m: &Match, max: usize) -> Vec<String> {
    let reasons: Vec<String> = m
        .top_contributions(max.clamp(1, MAX_REASONS))
        .map(|c| c.reason.clone())
        .collect();
    if !reasons.is_empty() {
        return reasons;
    }
    if m.is_no_signal() {
        vec![NO_COMPARABLE_DATA.to_string()]
    } else {
        vec![NOTHING_IN_COMMON.to_string()]
    }
}

/// A match together with its rendered reasons, as handed to sinks and output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainedMatch {
    #[serde(flatten)]
    pub matched: Match,
    pub reasons: Vec<String>,
}

impl ExplainedMatch {
    pub fn new(matched: Match, max_reasons: usize) -> Self {
        let reasons = explain(&matched, max_reasons);
        Self { matched, reasons }
    }
}
