//! Configuration loading from explicit and project files.

use std::fs;

use rapport::RapportError;
use rapport::config::Config;
use rapport::metrics::MetricKind;
use tempfile::tempdir;

#[test]
fn explicit_file_is_merged_over_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(
        &path,
        r#"
[engine]
max_reasons = 2
default_profile = "hiring"

[data]
actors_path = "people.jsonl"

[profiles.hiring]
candidate_personas = ["developer"]

[profiles.hiring.signals.interests]
metric = "jaccard"
weight = 1.0
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path), dir.path()).unwrap();
    assert_eq!(config.engine.max_reasons, 2);
    assert_eq!(config.engine.default_top_k, 10);
    assert!(config.engine.parallel);
    assert_eq!(
        config.data.actors_path.as_deref(),
        Some(std::path::Path::new("people.jsonl"))
    );

    let registry = config.profile_registry().unwrap();
    let hiring = registry.get("hiring").unwrap();
    assert_eq!(hiring.name, "hiring");
    assert_eq!(hiring.signals["interests"].metric, MetricKind::Jaccard);
    assert!(registry.get("developer").is_ok());
    assert_eq!(config.engine_options().max_reasons, 2);
}

#[test]
fn project_file_under_root_is_loaded() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[engine]\nparallel = false\ndefault_top_k = 3\n",
    )
    .unwrap();

    let config = Config::load(None, dir.path()).unwrap();
    assert!(!config.engine.parallel);
    assert_eq!(config.engine.default_top_k, 3);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = Config::load(Some(&dir.path().join("absent.toml")), dir.path()).unwrap_err();
    assert!(matches!(err, RapportError::Config(_)));
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[engine]\nthreads = 4\n").unwrap();
    assert!(matches!(
        Config::load(Some(&path), dir.path()),
        Err(RapportError::Config(_))
    ));
}

#[test]
fn out_of_range_engine_values_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[engine]\nmax_reasons = 5\n").unwrap();
    assert!(Config::load(Some(&path), dir.path()).is_err());
}

#[test]
fn invalid_profile_in_config_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(
        &path,
        "[profiles.broken.signals.interests]\nmetric = \"jaccard\"\nweight = -2.0\n",
    )
    .unwrap();
    assert!(matches!(
        Config::load(Some(&path), dir.path()),
        Err(RapportError::InvalidProfile { .. })
    ));
}

#[test]
fn unresolvable_default_profile_fails_registry() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "[engine]\ndefault_profile = \"nobody\"\n").unwrap();
    let config = Config::load(Some(&path), dir.path()).unwrap();
    assert!(matches!(
        config.profile_registry(),
        Err(RapportError::ProfileNotFound { .. })
    ));
}
