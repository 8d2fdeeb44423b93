//! Error handling for rapport.
//!
//! - [`RapportError`]: the error enum returned by every fallible operation
//! - [`ErrorCode`]: numeric codes for machine-readable output
//! - [`StructuredError`]: an error with code, suggestion and context
//! - Suggestion helpers for recovery hints

mod codes;
mod suggestions;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;
pub use suggestions::{suggest_for_error, suggest_similar};

/// Main error type for rapport operations.
#[derive(Error, Debug)]
pub enum RapportError {
    #[error("Actor not found: {0}")]
    ActorNotFound(String),

    #[error("Duplicate actor id: {0}")]
    DuplicateActor(String),

    #[error("Actor '{0}' has not consented to matching")]
    ConsentWithheld(String),

    #[error("Profile not found: {name}")]
    ProfileNotFound {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("Invalid profile '{profile}': {reason}")]
    InvalidProfile { profile: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid feedback: {0}")]
    InvalidFeedback(String),

    #[error("Unsupported actor file format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RapportError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ActorNotFound(_) => ErrorCode::ActorNotFound,
            Self::DuplicateActor(_) => ErrorCode::ActorDuplicate,
            Self::ConsentWithheld(_) => ErrorCode::ConsentWithheld,
            Self::ProfileNotFound { .. } => ErrorCode::ProfileNotFound,
            Self::InvalidProfile { .. } => ErrorCode::ProfileInvalid,
            Self::Config(_) | Self::Toml(_) => ErrorCode::ConfigInvalid,
            Self::InvalidRequest(_) => ErrorCode::RequestInvalid,
            Self::InvalidFeedback(_) => ErrorCode::FeedbackInvalid,
            Self::UnsupportedFormat(_) => ErrorCode::UnsupportedFormat,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::Yaml(_) => ErrorCode::SerializationError,
        }
    }

    /// Context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::ActorNotFound(id) | Self::DuplicateActor(id) | Self::ConsentWithheld(id) => {
                Some(serde_json::json!({ "actor_id": id }))
            }
            Self::ProfileNotFound { name, suggestions } => Some(serde_json::json!({
                "profile": name,
                "suggestions": suggestions,
            })),
            Self::InvalidProfile { profile, reason } => {
                Some(serde_json::json!({ "profile": profile, "reason": reason }))
            }
            Self::UnsupportedFormat(path) => Some(serde_json::json!({ "path": path })),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: ErrorCode,
    pub numeric_code: u16,
    pub message: String,
    pub suggestion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    pub recoverable: bool,
    /// Error category (e.g., "actor", "profile", "config")
    pub category: String,
}

impl StructuredError {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_error(err: &RapportError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }

    /// Add context, regenerating the suggestion from it.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self.suggestion = suggest_for_error(self.code, self.context.as_ref());
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<RapportError> for StructuredError {
    fn from(err: RapportError) -> Self {
        Self::from_error(&err)
    }
}

impl From<&RapportError> for StructuredError {
    fn from(err: &RapportError) -> Self {
        Self::from_error(err)
    }
}

/// Result type alias using [`RapportError`].
pub type Result<T> = std::result::Result<T, RapportError>;
