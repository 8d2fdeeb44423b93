//! Generators for actors, signal values and profiles.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

use rapport::metrics::{MetricKind, NumericMode, SignalParams};
use rapport::model::{Actor, ProximityEvent, SignalValue, TimeWindow};
use rapport::scoring::{SignalSpec, WeightProfile};

const TAGS: &[&str] = &[
    "vr", "indie", "ai", "fintech", "audio", "cloud", "mobile", "devtools", "health", "games",
];
const STAGES: &[&str] = &["startup", "investor", "developer", "publisher", "mentor", "mentee"];
const WORDS: &[&str] = &[
    "studio", "games", "payments", "platform", "rhythm", "multiplayer", "seed", "fund",
    "tooling", "cloud", "audio", "engine",
];

const REGIONS: &[&str] = &["eu", "us"];
const PERSONAS: &[&str] = &["developer", "investor", "publisher"];

pub const IDS: &[&str] = &["a0", "a1", "a2", "a3", "a4", "a5"];

pub fn base_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

pub fn arb_tags() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(TAGS), 0..6)
        .prop_map(|tags| tags.into_iter().map(str::to_string).collect())
}

pub fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 0..8).prop_map(|words| words.join(" "))
}

pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..400).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + Duration::days(offset)
    })
}

pub fn arb_windows() -> impl Strategy<Value = Vec<TimeWindow>> {
    prop::collection::vec((0i64..48, -2i64..10), 0..4).prop_map(|spans| {
        spans
            .into_iter()
            .map(|(start, hours)| {
                let start = base_instant() + Duration::hours(start);
                TimeWindow::new(start, start + Duration::hours(hours))
            })
            .collect()
    })
}

pub fn arb_events() -> impl Strategy<Value = Vec<ProximityEvent>> {
    prop::collection::vec((prop::sample::select(IDS), -30i64..5), 0..4).prop_map(|events| {
        events
            .into_iter()
            .map(|(peer, days)| ProximityEvent::new(peer, base_instant() + Duration::days(days)))
            .collect()
    })
}

/// A value of the variant `kind` accepts.
pub fn arb_value_for(kind: MetricKind) -> BoxedStrategy<SignalValue> {
    match kind {
        MetricKind::Temporal => arb_date().prop_map(SignalValue::Date).boxed(),
        MetricKind::Jaccard => arb_tags().prop_map(SignalValue::Tags).boxed(),
        MetricKind::Cosine => prop_oneof![
            arb_tags().prop_map(SignalValue::Tags),
            prop::collection::btree_map(
                prop::sample::select(TAGS).prop_map(str::to_string),
                0.0f64..5.0,
                0..5
            )
            .prop_map(SignalValue::TagCounts),
        ]
        .boxed(),
        MetricKind::Numeric => prop_oneof![
            (-100.0f64..1000.0).prop_map(SignalValue::Scalar),
            Just(SignalValue::Scalar(f64::NAN)),
        ]
        .boxed(),
        MetricKind::EditDistance | MetricKind::Ngram => {
            "[a-zA-Z ]{0,16}".prop_map(SignalValue::Label).boxed()
        }
        MetricKind::Tfidf => arb_text().prop_map(SignalValue::Text).boxed(),
        MetricKind::Bipartite => (arb_tags(), arb_tags())
            .prop_map(|(capabilities, needs)| SignalValue::Exchange {
                capabilities,
                needs,
            })
            .boxed(),
        MetricKind::Complement => prop::sample::select(STAGES)
            .prop_map(SignalValue::category)
            .boxed(),
        MetricKind::Recency => arb_events().prop_map(SignalValue::Events).boxed(),
        MetricKind::Availability => arb_windows().prop_map(SignalValue::Availability).boxed(),
    }
}

pub fn arb_kind() -> impl Strategy<Value = MetricKind> {
    prop::sample::select(MetricKind::all())
}

pub fn arb_params(kind: MetricKind) -> BoxedStrategy<SignalParams> {
    match kind {
        MetricKind::Numeric => prop_oneof![
            Just(NumericMode::ZScore),
            Just(NumericMode::MinMax),
            Just(NumericMode::Ratio),
        ]
        .prop_flat_map(|mode| {
            let range = if mode == NumericMode::MinMax {
                prop::option::of(Just([-100.0, 1000.0])).boxed()
            } else {
                Just(None).boxed()
            };
            range.prop_map(move |range| SignalParams {
                numeric: Some(mode),
                range,
                ..SignalParams::default()
            })
        })
        .boxed(),
        _ => Just(SignalParams::default()).boxed(),
    }
}

/// Signal names paired with the metric each profile slot uses.
pub const SLOTS: &[(&str, MetricKind)] = &[
    ("arrival", MetricKind::Temporal),
    ("interests", MetricKind::Jaccard),
    ("topics", MetricKind::Cosine),
    ("team_size", MetricKind::Numeric),
    ("company", MetricKind::Ngram),
    ("title", MetricKind::EditDistance),
    ("bio", MetricKind::Tfidf),
    ("offer", MetricKind::Bipartite),
    ("stage", MetricKind::Complement),
    ("met", MetricKind::Recency),
    ("availability", MetricKind::Availability),
];

/// An actor carrying a random subset of the slot signals.
pub fn arb_actor(id: &'static str) -> impl Strategy<Value = Actor> {
    let slots: Vec<BoxedStrategy<Option<SignalValue>>> = SLOTS
        .iter()
        .map(|(_, kind)| prop::option::weighted(0.7, arb_value_for(*kind)).boxed())
        .collect();
    (
        slots,
        prop::option::of(prop::sample::select(REGIONS)),
        prop::sample::select(PERSONAS),
    )
        .prop_map(move |(values, region, persona)| {
            let mut actor = Actor::new(id).with_persona(persona);
            if let Some(region) = region {
                actor = actor.with_region(region);
            }
            for ((name, _), value) in SLOTS.iter().zip(values) {
                if let Some(value) = value {
                    actor = actor.with_signal(*name, value);
                }
            }
            actor
        })
}

/// A population with distinct ids `a0..aN`.
pub fn arb_population(max: usize) -> impl Strategy<Value = Vec<Actor>> {
    (2..=max.min(IDS.len())).prop_flat_map(|n| {
        IDS[..n]
            .iter()
            .map(|id| arb_actor(*id).boxed())
            .collect::<Vec<_>>()
    })
}

/// A valid profile over a non-empty subset of the slots.
pub fn arb_profile() -> impl Strategy<Value = WeightProfile> {
    let slots: Vec<BoxedStrategy<Option<SignalSpec>>> = SLOTS
        .iter()
        .map(|(_, kind)| {
            let kind = *kind;
            prop::option::weighted(0.6, (0.0f64..3.0, arb_params(kind)))
                .prop_map(move |spec| {
                    spec.map(|(weight, params)| SignalSpec::new(kind, weight).with_params(params))
                })
                .boxed()
        })
        .collect();
    slots.prop_filter_map("profile needs a signal", |specs| {
        let mut profile = WeightProfile::new("prop");
        for ((name, _), spec) in SLOTS.iter().zip(specs) {
            if let Some(spec) = spec {
                profile = profile.with_signal(*name, spec);
            }
        }
        (!profile.signals.is_empty()).then_some(profile)
    })
}
