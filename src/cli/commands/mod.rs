//! Command handlers.

use chrono::{DateTime, NaiveDate, Utc};

use crate::app::AppContext;
use crate::cli::Commands;
use crate::cli::output::{HumanLayout, styled_score};
use crate::error::Result;
use crate::scoring::ExplainedMatch;

pub mod batch;
pub mod completions;
pub mod feedback;
pub mod pair;
pub mod profiles;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Pair(args) => pair::run(ctx, args),
        Commands::Batch(args) => batch::run(ctx, args),
        Commands::Profiles(args) => profiles::run(ctx, args),
        Commands::Feedback(args) => feedback::run(ctx, args),
        Commands::Completions(args) => {
            completions::run(args);
            Ok(())
        }
    }
}

/// Parse `--as-of`: RFC 3339, or a bare date meaning midnight UTC.
pub(crate) fn parse_as_of(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("expected RFC 3339 timestamp or YYYY-MM-DD, got '{value}'"))
}

pub(crate) const MATCH_TSV_HEADERS: [&str; 6] =
    ["source", "candidate", "profile", "score", "status", "match_id"];

pub(crate) fn match_tsv_row(m: &ExplainedMatch) -> Vec<String> {
    let inner = &m.matched;
    vec![
        inner.source_id.clone(),
        inner.candidate_id.clone(),
        inner.profile.clone(),
        format!("{:.6}", inner.score),
        if inner.is_no_signal() { "no_signal" } else { "scored" }.to_string(),
        inner.id.clone(),
    ]
}

/// Append a match summary: score line, reasons, and per-signal breakdown
/// when `detailed`.
pub(crate) fn layout_match(
    layout: &mut HumanLayout,
    m: &ExplainedMatch,
    colors: bool,
    detailed: bool,
) {
    let inner = &m.matched;
    let score = if inner.is_no_signal() {
        "no signal".to_string()
    } else {
        styled_score(inner.score, colors)
    };
    layout.kv(&inner.candidate_id, &score);
    for reason in &m.reasons {
        layout.wrapped_bullet(reason);
    }
    if detailed {
        layout.blank().section("Signals");
        for c in &inner.contributions {
            let value = if c.applied {
                format!("{:.3} x {:.2} = {:.3}  {}", c.raw, c.weight, c.weighted, c.reason)
            } else {
                c.reason.clone()
            };
            layout.kv(&format!("{} ({})", c.signal, c.metric), &value);
        }
        layout.blank().kv("Match id", &inner.id);
    }
}
