//! Scoring engine: weight profiles, pairwise and batch scoring, prefiltering,
//! reason rendering, and feedback intake.

pub mod engine;
pub mod feedback;
pub mod prefilter;
pub mod profile;
pub mod reasons;

pub use engine::{BatchIndex, BatchOptions, BatchOutcome, EngineOptions, MatchEngine, match_id};
pub use feedback::{
    FeedbackIntake, FeedbackRecord, FeedbackSink, FeedbackSubmission, JsonlFeedbackSink,
    MemoryFeedbackSink, Verdict,
};
pub use profile::{
    DEFAULT_PROFILE, MAX_WEIGHT, ProfileRegistry, SignalSpec, WeightProfile, builtin_profiles,
};
pub use reasons::{ExplainedMatch, explain};
