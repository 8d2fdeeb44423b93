//! Actor files and population filters.

use std::fs;

use rapport::RapportError;
use rapport::model::{SignalValue, TimeWindow};
use rapport::store::{ActorSupply, InMemoryActorStore, PopulationFilter};
use rapport::test_utils::fixtures::{small_population, write_actor_file};
use tempfile::tempdir;

#[test]
fn fixture_population_round_trips_through_json_file() {
    let dir = tempdir().unwrap();
    let path = write_actor_file(dir.path(), "actors.json", &small_population()).unwrap();
    let store = InMemoryActorStore::load(&path).unwrap();

    assert_eq!(store.len(), 4);
    for actor in small_population() {
        assert_eq!(store.actor(&actor.id), Some(actor));
    }
}

#[test]
fn yaml_actor_file_with_every_signal_family() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("actors.yaml");
    fs::write(
        &path,
        r#"
- id: ada
  persona: developer
  region: eu-west
  consent: true
  signals:
    arrival: { type: date, value: 2026-03-01 }
    interests: { type: tags, value: [vr, indie] }
    topics: { type: tag_counts, value: { vr: 3, audio: 1 } }
    team_size: { type: scalar, value: 6 }
    company: { type: label, value: Nova Games }
    bio: { type: text, value: Small VR studio }
    offer: { type: exchange, value: { capabilities: [vr], needs: [funding] } }
    stage: { type: category, value: startup }
    met:
      type: events
      value:
        - { peer: bob, at: "2026-02-28T10:00:00Z" }
    availability:
      type: availability
      value:
        - { start: "2026-03-01T09:00:00Z", end: "2026-03-01T12:00:00Z" }
"#,
    )
    .unwrap();

    let store = InMemoryActorStore::load(&path).unwrap();
    let ada = store.actor("ada").unwrap();
    assert_eq!(ada.signals.len(), 10);
    assert_eq!(ada.signal("team_size"), Some(&SignalValue::Scalar(6.0)));
    match ada.signal("availability") {
        Some(SignalValue::Availability(windows)) => {
            assert_eq!(windows.len(), 1);
            assert!(TimeWindow::is_valid(&windows[0]));
        }
        other => panic!("unexpected availability: {other:?}"),
    }
}

#[test]
fn duplicate_ids_in_file_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("actors.jsonl");
    fs::write(
        &path,
        "{\"id\":\"ada\",\"consent\":true}\n{\"id\":\"ada\",\"consent\":true}\n",
    )
    .unwrap();
    assert!(matches!(
        InMemoryActorStore::load(&path),
        Err(RapportError::DuplicateActor(id)) if id == "ada"
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        InMemoryActorStore::load(&dir.path().join("none.json")),
        Err(RapportError::Io(_))
    ));
}

#[test]
fn population_combines_filters() {
    let store = InMemoryActorStore::from_actors(small_population()).unwrap();
    let filter = PopulationFilter::consenting()
        .with_personas(["developer", "publisher"])
        .with_region("EU-WEST");
    let ids: Vec<String> = store
        .population(&filter)
        .into_iter()
        .map(|actor| actor.id)
        .collect();
    assert_eq!(ids, vec!["pub-orbit".to_string(), "studio-nova".to_string()]);
}
