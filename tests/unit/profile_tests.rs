//! Weight profile parsing, validation and registry lookup.

use rapport::RapportError;
use rapport::metrics::{MetricKind, NumericMode};
use rapport::scoring::{ProfileRegistry, SignalSpec, WeightProfile};
use rapport::test_utils::{TestCase, run_table_tests};

#[test]
fn profile_parses_from_toml_with_params() {
    let raw = r#"
        name = "hiring"
        description = "Recruiters meeting candidates"
        min_score = 0.2
        candidate_personas = ["developer"]
        same_region = true

        [signals.interests]
        metric = "jaccard"
        weight = 1.5

        [signals.met]
        metric = "recency"
        weight = 0.5
        params = { half_life = "3days" }

        [signals.team_size]
        metric = "numeric"
        weight = 0.3
        params = { numeric = "min_max", range = [1.0, 500.0] }
    "#;
    let profile: WeightProfile = toml::from_str(raw).unwrap();
    profile.validate().unwrap();

    assert_eq!(profile.name, "hiring");
    assert!(profile.same_region);
    assert_eq!(profile.signals_using(MetricKind::Jaccard), vec!["interests"]);
    let met = &profile.signals["met"];
    assert!((met.params.half_life_days() - 3.0).abs() < 1e-12);
    let team = &profile.signals["team_size"];
    assert_eq!(team.params.numeric_mode(), NumericMode::MinMax);
    assert_eq!(team.params.range, Some([1.0, 500.0]));
}

#[test]
fn unknown_param_keys_are_rejected() {
    let raw = r#"
        [signals.interests]
        metric = "jaccard"
        weight = 1.0
        params = { halflife = "3days" }
    "#;
    assert!(toml::from_str::<WeightProfile>(raw).is_err());
}

#[test]
fn validation_table() {
    let base = || {
        WeightProfile::new("p").with_signal("interests", SignalSpec::new(MetricKind::Jaccard, 1.0))
    };
    let cases = vec![
        TestCase {
            name: "valid",
            input: base(),
            expected: true,
        },
        TestCase {
            name: "negative weight",
            input: base().with_signal("bio", SignalSpec::new(MetricKind::Tfidf, -0.1)),
            expected: false,
        },
        TestCase {
            name: "nan weight",
            input: base().with_signal("bio", SignalSpec::new(MetricKind::Tfidf, f64::NAN)),
            expected: false,
        },
        TestCase {
            name: "oversized weight",
            input: base().with_signal("bio", SignalSpec::new(MetricKind::Tfidf, 1e6)),
            expected: false,
        },
        TestCase {
            name: "zero weight allowed",
            input: base().with_signal("bio", SignalSpec::new(MetricKind::Tfidf, 0.0)),
            expected: true,
        },
        TestCase {
            name: "min score above one",
            input: base().with_min_score(1.5),
            expected: false,
        },
        TestCase {
            name: "no signals",
            input: WeightProfile::new("empty"),
            expected: false,
        },
    ];
    run_table_tests(cases, |profile| profile.validate().is_ok());
}

#[test]
fn registry_rejects_invalid_insert_and_keeps_builtins() {
    let mut registry = ProfileRegistry::with_builtins();
    let bad = WeightProfile::new("default")
        .with_signal("interests", SignalSpec::new(MetricKind::Jaccard, -1.0));
    assert!(matches!(
        registry.insert(bad),
        Err(RapportError::InvalidProfile { .. })
    ));
    assert_eq!(registry.get("default").unwrap().signals.len(), 7);
}

#[test]
fn registry_override_replaces_builtin() {
    let mut registry = ProfileRegistry::with_builtins();
    registry
        .insert(
            WeightProfile::new("default")
                .with_signal("interests", SignalSpec::new(MetricKind::Cosine, 2.0)),
        )
        .unwrap();
    let profile = registry.get("default").unwrap();
    assert_eq!(profile.signals.len(), 1);
    assert_eq!(profile.signals["interests"].metric, MetricKind::Cosine);
    assert_eq!(registry.len(), 5);
}

#[test]
fn unknown_profile_error_carries_suggestion() {
    let registry = ProfileRegistry::with_builtins();
    let err = registry.get("investr").unwrap_err();
    match &err {
        RapportError::ProfileNotFound { name, suggestions } => {
            assert_eq!(name, "investr");
            assert_eq!(suggestions.first().map(String::as_str), Some("investor"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let structured = err.to_structured();
    assert_eq!(structured.numeric_code, 201);
    assert!(structured.suggestion.contains("investor"));
}
