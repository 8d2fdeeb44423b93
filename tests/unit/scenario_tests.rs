//! End-to-end scoring scenarios over the fixture population.

use rapport::model::{Actor, MatchStatus, NO_COMPARABLE_DATA, SignalValue};
use rapport::scoring::{
    BatchOptions, EngineOptions, ExplainedMatch, MatchEngine, ProfileRegistry, SignalSpec,
    WeightProfile, explain,
};
use rapport::metrics::MetricKind;
use rapport::test_utils::fixtures::{
    as_of, fintech_investor, indie_studio, interests_only_profile, small_population,
    synthetic_population, vr_publisher,
};

fn registry() -> ProfileRegistry {
    ProfileRegistry::with_builtins()
}

#[test]
fn publisher_meets_studio_on_offer_and_stage() {
    let profiles = registry();
    let profile = profiles.get("publisher").unwrap();
    let matched = MatchEngine::default()
        .score_pair(&vr_publisher(), &indie_studio(), profile, as_of())
        .unwrap();

    assert_eq!(matched.status, MatchStatus::Scored);
    assert!(matched.score > 0.5, "score {}", matched.score);

    let reasons = explain(&matched, 3);
    assert_eq!(reasons.len(), 3);
    assert_eq!(reasons[0], "complementary offer: funding, publishing, vr");
    assert!(reasons[1].starts_with("complementary stage/intent"));
}

#[test]
fn contributions_account_for_score() {
    let profiles = registry();
    let profile = profiles.get("default").unwrap();
    let matched = MatchEngine::default()
        .score_pair(&indie_studio(), &vr_publisher(), profile, as_of())
        .unwrap();

    assert_eq!(matched.contributions.len(), profile.signals.len());
    assert!((matched.recomputed_score() - matched.score).abs() < 1e-9);
    for c in &matched.contributions {
        if c.applied {
            assert!((c.weighted - c.raw * c.weight).abs() < 1e-12);
        } else {
            assert_eq!(c.weight, 0.0);
            assert_eq!(c.reason, NO_COMPARABLE_DATA);
        }
    }
}

#[test]
fn recent_encounter_is_explained() {
    let profile = WeightProfile::new("met-only")
        .with_signal("met", SignalSpec::new(MetricKind::Recency, 1.0));
    let matched = MatchEngine::default()
        .score_pair(&indie_studio(), &vr_publisher(), &profile, as_of())
        .unwrap();

    // One day old with a seven day half-life.
    assert!((matched.score - 0.5f64.powf(1.0 / 7.0)).abs() < 1e-9);
    assert!(explain(&matched, 1)[0].starts_with("recently met"));
}

#[test]
fn disjoint_actors_have_no_signal() {
    let a = Actor::new("a").with_signal("bio", SignalValue::text("rust tooling"));
    let b = Actor::new("b").with_signal("interests", SignalValue::tags(["vr"]));
    let matched = MatchEngine::default()
        .score_pair(&a, &b, &interests_only_profile(), as_of())
        .unwrap();

    assert_eq!(matched.status, MatchStatus::NoSignal);
    assert_eq!(matched.score, 0.0);
    assert_eq!(explain(&matched, 3), vec![NO_COMPARABLE_DATA.to_string()]);
}

#[test]
fn ordered_pairs_share_score_but_not_id() {
    let profiles = registry();
    let profile = profiles.get("default").unwrap();
    let engine = MatchEngine::default();
    let ab = engine
        .score_pair(&indie_studio(), &vr_publisher(), profile, as_of())
        .unwrap();
    let ba = engine
        .score_pair(&vr_publisher(), &indie_studio(), profile, as_of())
        .unwrap();

    assert!((ab.score - ba.score).abs() < 1e-12);
    assert_ne!(ab.id, ba.id);
}

#[test]
fn batch_ranks_publisher_above_investor() {
    let profiles = registry();
    let profile = profiles.get("default").unwrap();
    let outcome = MatchEngine::default()
        .batch(
            &indie_studio(),
            &small_population(),
            profile,
            &BatchOptions::new(10, as_of()),
        )
        .unwrap();

    let ids: Vec<&str> = outcome
        .matches
        .iter()
        .map(|m| m.candidate_id.as_str())
        .collect();
    assert_eq!(ids, vec!["pub-orbit", "vc-ledger"]);
    assert_eq!(outcome.population, 4);
    // Source and the non-consenting attendee are not eligible.
    assert_eq!(outcome.eligible, 2);
    assert_eq!(outcome.pruned, 0);
}

#[test]
fn publisher_profile_only_considers_developers() {
    let profiles = registry();
    let profile = profiles.get("publisher").unwrap();
    let outcome = MatchEngine::default()
        .batch(
            &vr_publisher(),
            &small_population(),
            profile,
            &BatchOptions::new(10, as_of()),
        )
        .unwrap();

    let ids: Vec<&str> = outcome
        .matches
        .iter()
        .map(|m| m.candidate_id.as_str())
        .collect();
    assert_eq!(ids, vec!["studio-nova"]);
}

#[test]
fn investor_without_overlap_scores_low() {
    let profiles = registry();
    let profile = profiles.get("default").unwrap();
    let matched = MatchEngine::default()
        .score_pair(&indie_studio(), &fintech_investor(), profile, as_of())
        .unwrap();
    let interests = matched
        .contributions
        .iter()
        .find(|c| c.signal == "interests")
        .unwrap();
    assert_eq!(interests.raw, 0.0);
    assert!(matched.score < 0.3, "score {}", matched.score);
}

#[test]
fn min_score_prunes_without_changing_survivors() {
    let profiles = registry();
    let profile = profiles.get("attendee").unwrap();
    let population = synthetic_population(60);
    let source = &population[1];
    let engine = MatchEngine::default();

    let all = engine
        .batch(source, &population, profile, &BatchOptions::new(100, as_of()))
        .unwrap();
    let strict = engine
        .batch(
            source,
            &population,
            profile,
            &BatchOptions::new(100, as_of()).with_min_score(0.5),
        )
        .unwrap();

    let expected: Vec<_> = all.matches.iter().filter(|m| m.score >= 0.5).collect();
    assert_eq!(strict.matches.len(), expected.len());
    for (got, want) in strict.matches.iter().zip(expected) {
        assert_eq!(got, want);
    }
    assert_eq!(strict.eligible, all.eligible);
}

#[test]
fn parallel_and_sequential_agree() {
    let profiles = registry();
    let profile = profiles.get("developer").unwrap();
    let population = synthetic_population(80);
    let options = BatchOptions::new(25, as_of());

    let parallel = MatchEngine::new(EngineOptions {
        parallel: true,
        ..EngineOptions::default()
    })
    .batch(&population[4], &population, profile, &options)
    .unwrap();
    let sequential = MatchEngine::new(EngineOptions {
        parallel: false,
        ..EngineOptions::default()
    })
    .batch(&population[4], &population, profile, &options)
    .unwrap();

    assert_eq!(parallel.matches, sequential.matches);
}

#[test]
fn explained_match_serializes_flat() {
    let profiles = registry();
    let profile = profiles.get("default").unwrap();
    let matched = MatchEngine::default()
        .score_pair(&indie_studio(), &vr_publisher(), profile, as_of())
        .unwrap();
    let explained = ExplainedMatch::new(matched, 2);

    let json = serde_json::to_value(&explained).unwrap();
    assert_eq!(json["candidate_id"], "pub-orbit");
    assert_eq!(json["reasons"].as_array().unwrap().len(), 2);
    assert_eq!(json["id"].as_str().unwrap().len(), 32);
}
