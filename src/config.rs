use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RapportError, Result};
use crate::scoring::{DEFAULT_PROFILE, EngineOptions, ProfileRegistry, WeightProfile};
use crate::scoring::reasons::MAX_REASONS;

/// Project directory used when `RAPPORT_ROOT` is unset.
pub const DEFAULT_ROOT: &str = ".rapport";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub data: DataConfig,
    /// Named profiles adding to or replacing the built-in personas.
    #[serde(default)]
    pub profiles: BTreeMap<String, WeightProfile>,
}

impl Config {
    /// Load configuration: an explicit file (or `RAPPORT_CONFIG`) alone, or
    /// else the global file followed by the project file. Environment
    /// variables override last.
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("RAPPORT_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(RapportError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match dirs::config_dir() {
            Some(dir) => Self::load_patch(&dir.join("rapport/config.toml")),
            None => Ok(None),
        }
    }

    fn load_project(root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&root.join("config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| RapportError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| RapportError::Config(format!("parse config {}: {err}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded config patch");
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.engine {
            self.engine.merge(patch);
        }
        if let Some(patch) = patch.data {
            self.data.merge(patch);
        }
        for (name, mut profile) in patch.profiles.unwrap_or_default() {
            profile.name.clone_from(&name);
            self.profiles.insert(name, profile);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("RAPPORT_PARALLEL") {
            self.engine.parallel = parse_bool("RAPPORT_PARALLEL", &value)?;
        }
        if let Some(value) = lookup("RAPPORT_MAX_REASONS") {
            self.engine.max_reasons = parse_usize("RAPPORT_MAX_REASONS", &value)?;
        }
        if let Some(value) = lookup("RAPPORT_DEFAULT_TOP_K") {
            self.engine.default_top_k = parse_usize("RAPPORT_DEFAULT_TOP_K", &value)?;
        }
        if let Some(value) = lookup("RAPPORT_DEFAULT_PROFILE") {
            self.engine.default_profile = value;
        }
        if let Some(value) = lookup("RAPPORT_ACTORS_PATH") {
            self.data.actors_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("RAPPORT_FEEDBACK_PATH") {
            self.data.feedback_path = Some(PathBuf::from(value));
        }
        Ok(())
    }

    /// Reject out-of-range engine settings and invalid profiles.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_REASONS).contains(&self.engine.max_reasons) {
            return Err(RapportError::Config(format!(
                "engine.max_reasons must be between 1 and {MAX_REASONS}, got {}",
                self.engine.max_reasons
            )));
        }
        if self.engine.default_top_k == 0 {
            return Err(RapportError::Config(
                "engine.default_top_k must be at least 1".to_string(),
            ));
        }
        if self.engine.default_profile.trim().is_empty() {
            return Err(RapportError::Config(
                "engine.default_profile must not be empty".to_string(),
            ));
        }
        for profile in self.profiles.values() {
            profile.validate()?;
        }
        Ok(())
    }

    /// Built-in profiles overlaid with the configured ones.
    ///
    /// Fails when the configured default profile does not resolve.
    pub fn profile_registry(&self) -> Result<ProfileRegistry> {
        let mut registry = ProfileRegistry::with_builtins();
        for profile in self.profiles.values() {
            registry.insert(profile.clone())?;
        }
        registry.get(&self.engine.default_profile)?;
        Ok(registry)
    }

    pub const fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            parallel: self.engine.parallel,
            max_reasons: self.engine.max_reasons,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_true")]
    pub parallel: bool,
    #[serde(default = "default_max_reasons")]
    pub max_reasons: usize,
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
    #[serde(default = "default_profile")]
    pub default_profile: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_reasons: default_max_reasons(),
            default_top_k: default_top_k(),
            default_profile: default_profile(),
        }
    }
}

impl EngineConfig {
    fn merge(&mut self, patch: EnginePatch) {
        if let Some(value) = patch.parallel {
            self.parallel = value;
        }
        if let Some(value) = patch.max_reasons {
            self.max_reasons = value;
        }
        if let Some(value) = patch.default_top_k {
            self.default_top_k = value;
        }
        if let Some(value) = patch.default_profile {
            self.default_profile = value;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Actor file (`.json`, `.jsonl`, `.yaml`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors_path: Option<PathBuf>,
    /// Append-only JSONL file receiving feedback records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_path: Option<PathBuf>,
}

impl DataConfig {
    fn merge(&mut self, patch: DataPatch) {
        if let Some(value) = patch.actors_path {
            self.actors_path = Some(value);
        }
        if let Some(value) = patch.feedback_path {
            self.feedback_path = Some(value);
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_max_reasons() -> usize {
    MAX_REASONS
}

const fn default_top_k() -> usize {
    10
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    engine: Option<EnginePatch>,
    data: Option<DataPatch>,
    profiles: Option<BTreeMap<String, WeightProfile>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnginePatch {
    parallel: Option<bool>,
    max_reasons: Option<usize>,
    default_top_k: Option<usize>,
    default_profile: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DataPatch {
    actors_path: Option<PathBuf>,
    feedback_path: Option<PathBuf>,
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(RapportError::Config(format!(
            "invalid {key} value {value}: expected a boolean"
        ))),
    }
}

fn parse_usize(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|err| RapportError::Config(format!("invalid {key} value {value}: {err}")))
}
