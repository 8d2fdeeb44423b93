//! Feedback intake: accept/reject verdicts on previously produced matches.
//!
//! Intake validates the shape of a submission and forwards it to a sink.
//! It never touches the match or any weight profile.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RapportError, Result};

/// Maximum note length, in characters.
pub const MAX_NOTE_CHARS: usize = 500;

/// Length of a match id in hex characters.
pub const MATCH_ID_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accept,
    Reject,
}

impl Verdict {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = RapportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "accept" | "accepted" | "yes" => Ok(Self::Accept),
            "reject" | "rejected" | "no" => Ok(Self::Reject),
            other => Err(RapportError::InvalidFeedback(format!(
                "unknown verdict '{other}', expected accept or reject"
            ))),
        }
    }
}

/// What a caller submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    pub match_id: String,
    pub source_id: String,
    pub candidate_id: String,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl FeedbackSubmission {
    /// Check the submission shape.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(RapportError::InvalidFeedback(msg));

        if self.match_id.len() != MATCH_ID_LEN
            || !self.match_id.chars().all(|c| c.is_ascii_hexdigit())
        {
            return invalid(format!(
                "match id must be {MATCH_ID_LEN} hex characters, got '{}'",
                self.match_id
            ));
        }
        if self.source_id.trim().is_empty() || self.candidate_id.trim().is_empty() {
            return invalid("source and candidate ids must not be empty".to_string());
        }
        if self.source_id == self.candidate_id {
            return invalid("source and candidate must differ".to_string());
        }
        if let Some(note) = &self.note {
            let chars = note.chars().count();
            if chars > MAX_NOTE_CHARS {
                return invalid(format!(
                    "note is {chars} characters, maximum is {MAX_NOTE_CHARS}"
                ));
            }
        }
        Ok(())
    }
}

/// A validated feedback record as forwarded to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub match_id: String,
    pub source_id: String,
    pub candidate_id: String,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Destination for feedback records.
pub trait FeedbackSink: Send + Sync {
    fn record(&self, record: &FeedbackRecord) -> Result<()>;
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryFeedbackSink {
    records: Mutex<Vec<FeedbackRecord>>,
}

impl MemoryFeedbackSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<FeedbackRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl FeedbackSink for MemoryFeedbackSink {
    fn record(&self, record: &FeedbackRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Appends one JSON line per record, holding an exclusive file lock while
/// writing.
#[derive(Debug, Clone)]
pub struct JsonlFeedbackSink {
    path: PathBuf,
}

impl JsonlFeedbackSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back, skipping blank lines.
    pub fn read_all(&self) -> Result<Vec<FeedbackRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(RapportError::from))
            .collect()
    }
}

impl FeedbackSink for JsonlFeedbackSink {
    fn record(&self, record: &FeedbackRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;
        let written = file.write_all(line.as_bytes()).and_then(|()| file.flush());
        FileExt::unlock(&file)?;
        written?;
        Ok(())
    }
}

/// Validates submissions and forwards them to a sink.
#[derive(Clone)]
pub struct FeedbackIntake {
    sink: Arc<dyn FeedbackSink>,
}

impl fmt::Debug for FeedbackIntake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedbackIntake").finish_non_exhaustive()
    }
}

impl FeedbackIntake {
    pub fn new(sink: Arc<dyn FeedbackSink>) -> Self {
        Self { sink }
    }

    /// Validate and record a submission, stamping it with `now`.
    pub fn submit(
        &self,
        submission: FeedbackSubmission,
        now: DateTime<Utc>,
    ) -> Result<FeedbackRecord> {
        submission.validate()?;
        let record = FeedbackRecord {
            id: Uuid::new_v4(),
            match_id: submission.match_id.to_lowercase(),
            source_id: submission.source_id,
            candidate_id: submission.candidate_id,
            verdict: submission.verdict,
            note: submission.note.filter(|note| !note.trim().is_empty()),
            recorded_at: now,
        };
        self.sink.record(&record)?;
        tracing::info!(
            feedback_id = %record.id,
            match_id = %record.match_id,
            verdict = %record.verdict,
            "recorded feedback"
        );
        Ok(record)
    }
}
