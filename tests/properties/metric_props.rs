//! Metric families: boundedness, symmetry and monotonicity.

use chrono::Duration;
use proptest::prelude::*;

use rapport::metrics::recency::recency;
use rapport::metrics::sets::jaccard;
use rapport::metrics::temporal::date_proximity;
use rapport::metrics::{MetricInput, MetricKind, MetricRegistry, SignalParams};
use rapport::model::{ProximityEvent, SignalValue};

use super::strategies::{arb_date, arb_kind, arb_params, arb_tags, arb_value_for, base_instant};

fn input<'a>(params: &'a SignalParams, left: &'a str, right: &'a str) -> MetricInput<'a> {
    MetricInput {
        signal: "s",
        params,
        left_id: left,
        right_id: right,
        as_of: base_instant(),
        text_index: None,
        numeric_stats: None,
    }
}

fn arb_case() -> impl Strategy<Value = (MetricKind, SignalValue, SignalValue, SignalParams)> {
    arb_kind().prop_flat_map(|kind| {
        (
            Just(kind),
            arb_value_for(kind),
            arb_value_for(kind),
            arb_params(kind),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn every_metric_is_bounded((kind, a, b, params) in arb_case()) {
        let registry = MetricRegistry::with_defaults();
        let sim = registry.evaluate(kind, &a, &b, &input(&params, "a0", "a1"));
        let sim = sim.expect("accepted variants are comparable");
        prop_assert!(sim.value.is_finite());
        prop_assert!((0.0..=1.0).contains(&sim.value), "{kind}: {}", sim.value);
    }

    #[test]
    fn every_metric_is_symmetric((kind, a, b, params) in arb_case()) {
        let registry = MetricRegistry::with_defaults();
        let ab = registry.evaluate(kind, &a, &b, &input(&params, "a0", "a1")).unwrap();
        let ba = registry.evaluate(kind, &b, &a, &input(&params, "a1", "a0")).unwrap();
        prop_assert!((ab.value - ba.value).abs() < 1e-9, "{kind}: {} vs {}", ab.value, ba.value);
    }

    #[test]
    fn jaccard_grows_with_shared_tags(a in arb_tags(), b in arb_tags()) {
        let before = jaccard(&a, &b).value;
        if let Some(missing) = a.iter().find(|tag| !b.contains(tag)) {
            let mut grown = b.clone();
            grown.push(missing.clone());
            let after = jaccard(&a, &grown).value;
            prop_assert!(after > before, "{before} -> {after}");
        }
    }

    #[test]
    fn identical_tag_sets_score_one(a in arb_tags()) {
        prop_assume!(!a.is_empty());
        prop_assert!((jaccard(&a, &a).value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn temporal_decays_with_distance(a in arb_date(), gap in 0i64..300, extra in 0i64..100) {
        let near = date_proximity(a, a + Duration::days(gap), 180.0).value;
        let far = date_proximity(a, a + Duration::days(gap + extra), 180.0).value;
        prop_assert!(far <= near);
    }

    #[test]
    fn recency_decays_with_age(age in 0i64..60, extra in 0i64..60) {
        let at = |days: i64| vec![ProximityEvent::new("b", base_instant() - Duration::days(days))];
        let recent = recency("a", &at(age), "b", &[], base_instant(), 7.0).value;
        let older = recency("a", &at(age + extra), "b", &[], base_instant(), 7.0).value;
        prop_assert!(older <= recent);
    }
}
