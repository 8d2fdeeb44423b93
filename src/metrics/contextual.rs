//! Contextual complement between categorical attributes.
//!
//! Some categories are worth more together than apart: an early-stage
//! company and an investor, a developer and a publisher. The table is
//! symmetric; pairs not listed (identical categories included) score 0.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::model::SignalValue;

use super::{MetricInput, Similarity};

const BUILTIN_COMPLEMENTS: &[(&str, &str, f64)] = &[
    ("early-stage", "investor", 1.0),
    ("startup", "investor", 1.0),
    ("developer", "publisher", 1.0),
    ("hiring", "job-seeker", 1.0),
    ("mentor", "mentee", 1.0),
    ("buyer", "seller", 1.0),
    ("service-provider", "startup", 1.0),
    ("sponsor", "organizer", 1.0),
];

static BUILTIN: LazyLock<ComplementTable> = LazyLock::new(|| {
    let mut table = ComplementTable::default();
    for (a, b, strength) in BUILTIN_COMPLEMENTS {
        table.insert(a, b, *strength);
    }
    table
});

/// Symmetric lookup table of complementary category pairs.
#[derive(Debug, Clone, Default)]
pub struct ComplementTable {
    pairs: HashMap<(String, String), f64>,
}

impl ComplementTable {
    /// The built-in table.
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    pub fn insert(&mut self, a: &str, b: &str, strength: f64) {
        let strength = if strength.is_finite() {
            strength.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.pairs.insert(key(a, b), strength);
    }

    /// Strength of the complement between two categories; 0 if unknown.
    pub fn strength(&self, a: &str, b: &str) -> f64 {
        self.pairs.get(&key(a, b)).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn key(a: &str, b: &str) -> (String, String) {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a <= b { (a, b) } else { (b, a) }
}

/// Complement score of two categories, consulting `extra` pairs (strength
/// 1.0) before the built-in table. A blank category scores 0.
pub fn complement(a: &str, b: &str, extra: &[[String; 2]]) -> Similarity {
    let (ta, tb) = (a.trim().to_lowercase(), b.trim().to_lowercase());
    if ta.is_empty() || tb.is_empty() {
        return Similarity::zero("category missing");
    }
    let wanted = key(&ta, &tb);
    let declared = extra.iter().any(|[x, y]| key(x, y) == wanted);
    let strength = if declared {
        1.0
    } else {
        ComplementTable::builtin().strength(&ta, &tb)
    };
    if strength > 0.0 {
        Similarity::new(strength, format!("{ta} complements {tb}")).with_evidence(vec![ta, tb])
    } else {
        Similarity::zero(format!("{ta} and {tb} are not complementary"))
    }
}

pub(super) fn evaluate(
    left: &SignalValue,
    right: &SignalValue,
    input: &MetricInput<'_>,
) -> Option<Similarity> {
    match (left, right) {
        (SignalValue::Category(a), SignalValue::Category(b)) => {
            Some(complement(a, b, &input.params.complements))
        }
        _ => None,
    }
}
