//! rapport feedback - Record accept/reject feedback on a match.

use chrono::Utc;
use clap::{ArgGroup, Args};

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::cli::output::{HumanLayout, emit_human, emit_json, emit_jsonl, emit_tsv, robot_ok};
use crate::error::Result;
use crate::scoring::{FeedbackSubmission, Verdict};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("verdict").required(true).args(["accept", "reject"])))]
pub struct FeedbackArgs {
    /// Match id (32 hex characters, as printed by pair/batch)
    pub match_id: String,

    /// Source actor id of the match
    #[arg(long)]
    pub source: String,

    /// Candidate actor id of the match
    #[arg(long)]
    pub candidate: String,

    /// The match was useful
    #[arg(long)]
    pub accept: bool,

    /// The match was not useful
    #[arg(long)]
    pub reject: bool,

    /// Optional note (max 500 characters)
    #[arg(long)]
    pub note: Option<String>,
}

pub fn run(ctx: &AppContext, args: &FeedbackArgs) -> Result<()> {
    let verdict = if args.accept {
        Verdict::Accept
    } else {
        Verdict::Reject
    };
    let submission = FeedbackSubmission {
        match_id: args.match_id.clone(),
        source_id: args.source.clone(),
        candidate_id: args.candidate.clone(),
        verdict,
        note: args.note.clone(),
    };
    let record = ctx.service()?.feedback(submission, Utc::now())?;

    match ctx.output_format {
        OutputFormat::Json => emit_json(&robot_ok(&record)),
        OutputFormat::Jsonl => emit_jsonl(std::slice::from_ref(&record)),
        OutputFormat::Tsv => {
            emit_tsv(&["id", "match_id", "verdict"], std::slice::from_ref(&record), |r| {
                vec![r.id.to_string(), r.match_id.clone(), r.verdict.to_string()]
            });
            Ok(())
        }
        OutputFormat::Human => {
            let mut layout = HumanLayout::new();
            layout
                .title("Feedback recorded")
                .kv("Match", &record.match_id)
                .kv("Verdict", record.verdict.as_str())
                .kv("File", &ctx.feedback_path().display().to_string());
            emit_human(layout);
            Ok(())
        }
    }
}
