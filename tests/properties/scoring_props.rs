//! Scoring engine: determinism, consistency and prefilter soundness.

use proptest::prelude::*;

use rapport::metrics::MetricRegistry;
use rapport::model::MatchStatus;
use rapport::scoring::prefilter::upper_bound;
use rapport::scoring::{BatchOptions, EngineOptions, MatchEngine};

use super::strategies::{arb_actor, arb_population, arb_profile, base_instant};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn scoring_is_deterministic(a in arb_actor("a0"), b in arb_actor("a1"), profile in arb_profile()) {
        let engine = MatchEngine::default();
        let first = engine.score_pair(&a, &b, &profile, base_instant()).unwrap();
        let second = engine.score_pair(&a, &b, &profile, base_instant()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn score_is_bounded_and_matches_contributions(
        a in arb_actor("a0"),
        b in arb_actor("a1"),
        profile in arb_profile(),
    ) {
        let m = MatchEngine::default().score_pair(&a, &b, &profile, base_instant()).unwrap();
        prop_assert!((0.0..=1.0).contains(&m.score));
        prop_assert_eq!(m.contributions.len(), profile.signals.len());

        let applied: f64 = m.contributions.iter().filter(|c| c.applied).map(|c| c.weight).sum();
        prop_assert!((applied - m.weight_sum).abs() < 1e-9);
        prop_assert!((m.recomputed_score() - m.score).abs() < 1e-9);
        if m.status == MatchStatus::NoSignal {
            prop_assert_eq!(m.score, 0.0);
            prop_assert_eq!(m.weight_sum, 0.0);
        } else {
            prop_assert!(m.weight_sum > 0.0);
        }
        for c in &m.contributions {
            prop_assert!((0.0..=1.0).contains(&c.raw));
            prop_assert!(c.applied || c.weight == 0.0);
        }
    }

    #[test]
    fn pair_score_is_symmetric(a in arb_actor("a0"), b in arb_actor("a1"), profile in arb_profile()) {
        let engine = MatchEngine::default();
        let ab = engine.score_pair(&a, &b, &profile, base_instant()).unwrap();
        let ba = engine.score_pair(&b, &a, &profile, base_instant()).unwrap();
        prop_assert!((ab.score - ba.score).abs() < 1e-9);
        prop_assert_eq!(ab.status, ba.status);
    }

    #[test]
    fn upper_bound_never_undercuts_score(
        a in arb_actor("a0"),
        b in arb_actor("a1"),
        profile in arb_profile(),
    ) {
        let m = MatchEngine::default().score_pair(&a, &b, &profile, base_instant()).unwrap();
        let bound = upper_bound(&MetricRegistry::with_defaults(), &a, &b, &profile, base_instant());
        match bound {
            Some(bound) => prop_assert!(bound + 1e-9 >= m.score, "bound {bound} < score {}", m.score),
            None => prop_assert_eq!(m.status, MatchStatus::NoSignal),
        }
    }

    #[test]
    fn pruning_never_loses_a_qualifying_candidate(
        population in arb_population(6),
        profile in arb_profile(),
        min_score in 0.0f64..1.0,
    ) {
        let engine = MatchEngine::default();
        let source = &population[0];
        let everything = engine
            .batch(source, &population, &profile, &BatchOptions::new(10, base_instant()))
            .unwrap();
        let strict = engine
            .batch(
                source,
                &population,
                &profile,
                &BatchOptions::new(10, base_instant()).with_min_score(min_score),
            )
            .unwrap();

        let expected: Vec<_> = everything
            .matches
            .iter()
            .filter(|m| m.score >= min_score)
            .cloned()
            .collect();
        prop_assert_eq!(strict.matches, expected);
    }

    #[test]
    fn batch_is_ranked_truncated_and_pool_independent(
        population in arb_population(6),
        profile in arb_profile(),
        top_k in 1usize..5,
    ) {
        let options = BatchOptions::new(top_k, base_instant());
        let parallel = MatchEngine::default()
            .batch(&population[0], &population, &profile, &options)
            .unwrap();
        let sequential = MatchEngine::new(EngineOptions { parallel: false, ..EngineOptions::default() })
            .batch(&population[0], &population, &profile, &options)
            .unwrap();

        prop_assert!(parallel.matches.len() <= top_k);
        prop_assert!(parallel.matches.windows(2).all(|w| w[0].score >= w[1].score));
        prop_assert!(parallel.matches.iter().all(|m| m.candidate_id != population[0].id));
        prop_assert_eq!(&parallel.matches, &sequential.matches);
    }
}
