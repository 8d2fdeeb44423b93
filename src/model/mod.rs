//! Core data model: actors, their signal bundles, and scored matches.
//!
//! Actors are read-only within the engine. Matches are values produced
//! fresh by every scoring call and never updated in place.

mod actor;
mod matching;
mod signal;

pub use actor::Actor;
pub use matching::{Contribution, Match, MatchStatus, NO_COMPARABLE_DATA};
pub(crate) use matching::clamp_unit;
pub use signal::{ProximityEvent, SignalValue, TimeWindow};
