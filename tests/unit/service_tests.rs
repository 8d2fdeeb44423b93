//! Request-level operations over an in-memory store.

use std::sync::Arc;

use chrono::Utc;
use rapport::RapportError;
use rapport::metrics::{MetricKind, NumericMode, SignalParams};
use rapport::scoring::{
    FeedbackIntake, FeedbackSubmission, MatchEngine, MemoryFeedbackSink, ProfileRegistry,
    SignalSpec, Verdict, WeightProfile,
};
use rapport::service::{BatchRequest, MatchService, PairRequest};
use rapport::store::InMemoryActorStore;
use rapport::test_utils::fixtures::{as_of, small_population, synthetic_population};

fn service() -> MatchService<InMemoryActorStore> {
    let store = InMemoryActorStore::from_actors(small_population()).unwrap();
    MatchService::new(store, ProfileRegistry::with_builtins(), MatchEngine::default())
}

#[test]
fn pair_uses_requested_profile_and_instant() {
    let mut request = PairRequest::new("studio-nova", "pub-orbit");
    request.profile = Some("developer".into());
    request.as_of = Some(as_of());

    let first = service().pair(&request).unwrap();
    let second = service().pair(&request).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.matched.profile, "developer");
    assert_eq!(first.matched.scored_at, as_of());
    assert!(!first.reasons.is_empty() && first.reasons.len() <= 3);
}

#[test]
fn pair_scores_against_population_like_batch() {
    let zscore = SignalParams {
        numeric: Some(NumericMode::ZScore),
        ..SignalParams::default()
    };
    let profile = WeightProfile::new("sized")
        .with_signal("interests", SignalSpec::new(MetricKind::Jaccard, 1.0))
        .with_signal("bio", SignalSpec::new(MetricKind::Tfidf, 1.0))
        .with_signal(
            "team_size",
            SignalSpec::new(MetricKind::Numeric, 1.0).with_params(zscore),
        );
    let mut profiles = ProfileRegistry::with_builtins();
    profiles.insert(profile).unwrap();
    let store = InMemoryActorStore::from_actors(small_population()).unwrap();
    let service = MatchService::new(store, profiles, MatchEngine::default());

    let mut pair = PairRequest::new("studio-nova", "pub-orbit");
    pair.profile = Some("sized".into());
    pair.as_of = Some(as_of());
    let paired = service.pair(&pair).unwrap();

    let mut batch = BatchRequest::new("studio-nova");
    batch.profile = Some("sized".into());
    batch.as_of = Some(as_of());
    let report = service.batch(&batch).unwrap();
    let batched = report
        .matches
        .iter()
        .find(|m| m.matched.candidate_id == "pub-orbit")
        .unwrap();

    assert!((paired.matched.score - batched.matched.score).abs() < 1e-12);
    let team = paired
        .matched
        .contributions
        .iter()
        .find(|c| c.signal == "team_size")
        .unwrap();
    assert!(team.applied);
}

#[test]
fn pair_with_opted_out_candidate_is_rejected() {
    let err = service()
        .pair(&PairRequest::new("studio-nova", "quiet-attendee"))
        .unwrap_err();
    assert!(matches!(err, RapportError::ConsentWithheld(id) if id == "quiet-attendee"));
}

#[test]
fn batch_reports_counts_and_persona_filter() {
    let mut request = BatchRequest::new("studio-nova");
    request.personas = vec!["investor".into()];
    request.as_of = Some(as_of());

    let report = service().batch(&request).unwrap();
    assert_eq!(report.profile, "default");
    // Consenting investors only.
    assert_eq!(report.population, 1);
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].matched.candidate_id, "vc-ledger");
}

#[test]
fn batch_respects_top_k_and_min_score() {
    let store = InMemoryActorStore::from_actors(synthetic_population(40)).unwrap();
    let service = MatchService::new(store, ProfileRegistry::with_builtins(), MatchEngine::default())
        .with_default_top_k(5);

    let mut request = BatchRequest::new("a002");
    request.as_of = Some(as_of());
    let report = service.batch(&request).unwrap();
    assert_eq!(report.matches.len(), 5);
    assert!(
        report
            .matches
            .windows(2)
            .all(|w| w[0].matched.score >= w[1].matched.score)
    );

    request.min_score = Some(1.0);
    request.top_k = Some(50);
    let strict = service.batch(&request).unwrap();
    assert!(strict.matches.iter().all(|m| m.matched.score >= 1.0));
    assert_eq!(strict.eligible, report.eligible);
}

#[test]
fn invalid_min_score_is_rejected() {
    let mut request = BatchRequest::new("studio-nova");
    request.min_score = Some(1.5);
    assert!(matches!(
        service().batch(&request),
        Err(RapportError::InvalidRequest(_))
    ));
}

#[test]
fn feedback_round_trip_through_memory_sink() {
    let sink = Arc::new(MemoryFeedbackSink::new());
    let service = service().with_feedback(FeedbackIntake::new(sink.clone()));
    let matched = service
        .pair(&PairRequest::new("studio-nova", "pub-orbit"))
        .unwrap();

    let record = service
        .feedback(
            FeedbackSubmission {
                match_id: matched.matched.id.clone(),
                source_id: "studio-nova".into(),
                candidate_id: "pub-orbit".into(),
                verdict: Verdict::Accept,
                note: Some("great intro".into()),
            },
            Utc::now(),
        )
        .unwrap();

    assert_eq!(record.match_id, matched.matched.id);
    assert_eq!(sink.records(), vec![record]);
}

#[test]
fn malformed_feedback_is_rejected_before_the_sink() {
    let sink = Arc::new(MemoryFeedbackSink::new());
    let service = service().with_feedback(FeedbackIntake::new(sink.clone()));
    let err = service
        .feedback(
            FeedbackSubmission {
                match_id: "not-a-hash".into(),
                source_id: "studio-nova".into(),
                candidate_id: "pub-orbit".into(),
                verdict: Verdict::Reject,
                note: None,
            },
            Utc::now(),
        )
        .unwrap_err();
    assert!(matches!(err, RapportError::InvalidFeedback(_)));
    assert!(sink.is_empty());
}
