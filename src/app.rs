use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::{Cli, OutputFormat};
use crate::config::{Config, DEFAULT_ROOT};
use crate::error::{RapportError, Result};
use crate::scoring::{FeedbackIntake, JsonlFeedbackSink, MatchEngine, ProfileRegistry};
use crate::service::MatchService;
use crate::store::InMemoryActorStore;

/// Feedback file used when none is configured.
const DEFAULT_FEEDBACK_FILE: &str = "feedback.jsonl";

pub struct AppContext {
    pub root: PathBuf,
    pub config: Config,
    pub profiles: ProfileRegistry,
    /// Actor file from `--actors` or `data.actors_path`.
    pub actors_path: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = Self::find_root()?;
        let config = Config::load(cli.config.as_deref(), &root)?;
        let profiles = config.profile_registry()?;
        let actors_path = cli
            .actors
            .clone()
            .or_else(|| config.data.actors_path.clone());

        Ok(Self {
            root,
            profiles,
            actors_path,
            config,
            output_format: cli.output_format(),
            verbosity: cli.verbose,
        })
    }

    pub const fn machine_output(&self) -> bool {
        self.output_format.is_machine_readable()
    }

    /// Load the actor file and assemble the match service.
    pub fn service(&self) -> Result<MatchService<InMemoryActorStore>> {
        let path = self.actors_path.as_deref().ok_or_else(|| {
            RapportError::Config(
                "no actor file configured; pass --actors or set data.actors_path".to_string(),
            )
        })?;
        let store = InMemoryActorStore::load(path)?;
        let engine = MatchEngine::new(self.config.engine_options());
        let intake = FeedbackIntake::new(Arc::new(JsonlFeedbackSink::new(self.feedback_path())));

        Ok(MatchService::new(store, self.profiles.clone(), engine)
            .with_default_profile(self.config.engine.default_profile.clone())
            .with_default_top_k(self.config.engine.default_top_k)
            .with_feedback(intake))
    }

    /// Feedback file: `data.feedback_path` or `<root>/feedback.jsonl`.
    pub fn feedback_path(&self) -> PathBuf {
        self.config
            .data
            .feedback_path
            .clone()
            .unwrap_or_else(|| self.root.join(DEFAULT_FEEDBACK_FILE))
    }

    fn find_root() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("RAPPORT_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        Ok(find_upwards(&cwd, DEFAULT_ROOT).unwrap_or_else(|| cwd.join(DEFAULT_ROOT)))
    }
}

fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
