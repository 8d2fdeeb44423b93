use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::metrics::MetricKind;
use crate::model::{Actor, ProximityEvent, SignalValue, TimeWindow};
use crate::scoring::{SignalSpec, WeightProfile};

/// Fixed reference instant used by fixtures: 2026-03-01T09:00:00Z.
pub fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// A window of `hours` starting `offset_hours` after [`as_of`].
pub fn window(offset_hours: i64, hours: i64) -> TimeWindow {
    let start = as_of() + Duration::hours(offset_hours);
    TimeWindow::new(start, start + Duration::hours(hours))
}

/// An indie VR studio looking for a publisher.
pub fn indie_studio() -> Actor {
    Actor::new("studio-nova")
        .with_persona("developer")
        .with_region("eu-west")
        .with_signal("interests", SignalValue::tags(["indie", "vr", "multiplayer"]))
        .with_signal(
            "bio",
            SignalValue::text("Small indie studio building a multiplayer VR rhythm game"),
        )
        .with_signal(
            "offer",
            SignalValue::exchange(["vr", "unity"], ["publishing", "funding"]),
        )
        .with_signal("stage", SignalValue::category("developer"))
        .with_signal("company", SignalValue::label("Nova Games"))
        .with_signal("team_size", SignalValue::Scalar(6.0))
        .with_signal("availability", SignalValue::Availability(vec![window(0, 4)]))
        .with_signal("arrival", SignalValue::Date(date(2026, 3, 1)))
        .with_signal(
            "met",
            SignalValue::Events(vec![ProximityEvent::new(
                "pub-orbit",
                as_of() - Duration::days(1),
            )]),
        )
}

/// A publisher with an indie VR label.
pub fn vr_publisher() -> Actor {
    Actor::new("pub-orbit")
        .with_persona("publisher")
        .with_region("eu-west")
        .with_signal("interests", SignalValue::tags(["vr", "indie", "console"]))
        .with_signal(
            "bio",
            SignalValue::text("Publisher of indie VR and console games, funding small studios"),
        )
        .with_signal(
            "offer",
            SignalValue::exchange(["publishing", "funding", "marketing"], ["vr"]),
        )
        .with_signal("stage", SignalValue::category("publisher"))
        .with_signal("company", SignalValue::label("Orbit Publishing"))
        .with_signal("team_size", SignalValue::Scalar(40.0))
        .with_signal("availability", SignalValue::Availability(vec![window(2, 4)]))
        .with_signal("arrival", SignalValue::Date(date(2026, 3, 2)))
        .with_signal(
            "met",
            SignalValue::Events(vec![ProximityEvent::new(
                "studio-nova",
                as_of() - Duration::days(1),
            )]),
        )
}

/// A seed investor with no overlap in interests.
pub fn fintech_investor() -> Actor {
    Actor::new("vc-ledger")
        .with_persona("investor")
        .with_region("us-east")
        .with_signal("interests", SignalValue::tags(["fintech", "payments"]))
        .with_signal("bio", SignalValue::text("Seed fund backing payments infrastructure"))
        .with_signal("offer", SignalValue::exchange(["funding"], ["deal-flow"]))
        .with_signal("stage", SignalValue::category("investor"))
        .with_signal("team_size", SignalValue::Scalar(12.0))
}

/// An attendee who has opted out of matching.
pub fn opted_out() -> Actor {
    Actor::new("quiet-attendee")
        .with_persona("developer")
        .with_consent(false)
        .with_signal("interests", SignalValue::tags(["indie", "vr"]))
}

/// The four named fixtures above.
pub fn small_population() -> Vec<Actor> {
    vec![indie_studio(), vr_publisher(), fintech_investor(), opted_out()]
}

const TAG_POOL: &[&str] = &[
    "vr", "indie", "ai", "fintech", "games", "audio", "cloud", "web3", "mobile", "devtools",
    "health", "edtech",
];
const STAGES: &[&str] = &["startup", "investor", "developer", "publisher", "mentor", "mentee"];
const PERSONAS: &[&str] = &["developer", "publisher", "investor", "attendee"];

/// `n` deterministic synthetic actors with ids `a000`, `a001`, ...
///
/// Signals vary with the index so every metric family sees a spread of
/// values; every fifth actor lacks `bio` and every seventh lacks `offer`.
pub fn synthetic_population(n: usize) -> Vec<Actor> {
    (0..n).map(synthetic_actor).collect()
}

/// One synthetic actor, see [`synthetic_population`].
pub fn synthetic_actor(i: usize) -> Actor {
    let pick = |k: usize| TAG_POOL[(i * 7 + k * 3) % TAG_POOL.len()];
    let tags: Vec<&str> = (0..=(i % 4)).map(pick).collect();
    let mut actor = Actor::new(format!("a{i:03}"))
        .with_persona(PERSONAS[i % PERSONAS.len()])
        .with_region(if i % 2 == 0 { "eu-west" } else { "us-east" })
        .with_signal("interests", SignalValue::tags(tags.iter().copied()))
        .with_signal("stage", SignalValue::category(STAGES[i % STAGES.len()]))
        .with_signal("team_size", SignalValue::Scalar((1 + i % 50) as f64))
        .with_signal(
            "availability",
            SignalValue::Availability(vec![window((i % 8) as i64, 2 + (i % 3) as i64)]),
        )
        .with_signal(
            "arrival",
            SignalValue::Date(date(2026, 3, 1 + (i % 5) as u32)),
        );
    if i % 5 != 0 {
        actor = actor.with_signal(
            "bio",
            SignalValue::text(format!(
                "Team working on {} and {} products for conference partners",
                pick(1),
                pick(2)
            )),
        );
    }
    if i % 7 != 0 {
        actor = actor.with_signal("offer", SignalValue::exchange([pick(0)], [pick(3)]));
    }
    if i > 0 && i % 3 == 0 {
        actor = actor.with_signal(
            "met",
            SignalValue::Events(vec![ProximityEvent::new(
                format!("a{:03}", i - 1),
                as_of() - Duration::hours(i as i64),
            )]),
        );
    }
    actor
}

/// A profile that weighs only the `interests` tag set.
pub fn interests_only_profile() -> WeightProfile {
    WeightProfile::new("interests-only")
        .with_signal("interests", SignalSpec::new(MetricKind::Jaccard, 1.0))
}

/// Write actors as a JSON array to `dir/name` and return the path.
pub fn write_actor_file(dir: &Path, name: &str, actors: &[Actor]) -> crate::Result<PathBuf> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(actors)?)?;
    Ok(path)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
