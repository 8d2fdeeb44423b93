//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Actor errors
//! - 2xx: Profile errors
//! - 3xx: Config errors
//! - 4xx: Request errors
//! - 6xx: Storage errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `ActorNotFound` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Actor errors (1xx)
    /// E101: No actor with the requested id
    ActorNotFound,
    /// E102: Two actors share an id
    ActorDuplicate,
    /// E103: Actor has not consented to matching
    ConsentWithheld,

    // Profile errors (2xx)
    /// E201: No profile with the requested name
    ProfileNotFound,
    /// E202: Profile has invalid weights or parameters
    ProfileInvalid,

    // Config errors (3xx)
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,

    // Request errors (4xx)
    /// E401: Request arguments are malformed
    RequestInvalid,
    /// E402: Feedback record failed validation
    FeedbackInvalid,

    // Storage errors (6xx)
    /// E601: Actor file extension is not recognized
    UnsupportedFormat,
    /// E605: Serialization/deserialization failed
    SerializationError,

    // Internal errors (9xx)
    /// E906: File operation failed
    IoError,
}

impl ErrorCode {
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::ActorNotFound => 101,
            Self::ActorDuplicate => 102,
            Self::ConsentWithheld => 103,

            Self::ProfileNotFound => 201,
            Self::ProfileInvalid => 202,

            Self::ConfigInvalid => 302,

            Self::RequestInvalid => 401,
            Self::FeedbackInvalid => 402,

            Self::UnsupportedFormat => 601,
            Self::SerializationError => 605,

            Self::IoError => 906,
        }
    }

    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Static recovery hint for this code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::ActorNotFound => "Check the actor id. Use --actors <path> to point at the right actor file",
            Self::ActorDuplicate => "Actor ids must be unique. Remove or rename the duplicate entry",
            Self::ConsentWithheld => "Only actors with consent = true can be matched",
            Self::ProfileNotFound => "Run `rapport profiles list` to see available profiles",
            Self::ProfileInvalid => "Weights must be finite and non-negative. Run `rapport profiles show <name>` to inspect a profile",
            Self::ConfigInvalid => "Check TOML syntax and values in the config file",
            Self::RequestInvalid => "Check the command arguments. Run with --help for usage",
            Self::FeedbackInvalid => "Feedback needs a 32-character match id, distinct source and candidate, and a note of at most 500 characters",
            Self::UnsupportedFormat => "Actor files must end in .json, .jsonl, .yaml or .yml",
            Self::SerializationError => "The data format may be corrupted. Check input data for validity",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::SerializationError)
    }

    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "actor",
            2 => "profile",
            3 => "config",
            4 => "request",
            6 => "storage",
            _ => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code_string())
    }
}
