//! rapport pair - Score one actor against another.

use chrono::{DateTime, Utc};
use clap::Args;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::cli::output::{HumanLayout, emit_human, emit_json, emit_jsonl, emit_tsv, robot_ok};
use crate::error::Result;
use crate::service::PairRequest;

use super::{MATCH_TSV_HEADERS, layout_match, match_tsv_row, parse_as_of};

#[derive(Args, Debug)]
pub struct PairArgs {
    /// Source actor id
    pub source: String,

    /// Candidate actor id
    pub candidate: String,

    /// Weight profile (default: engine.default_profile)
    #[arg(long, short = 'p')]
    pub profile: Option<String>,

    /// Reference instant for recency (RFC 3339 or YYYY-MM-DD; default: now)
    #[arg(long, value_parser = parse_as_of)]
    pub as_of: Option<DateTime<Utc>>,
}

pub fn run(ctx: &AppContext, args: &PairArgs) -> Result<()> {
    let service = ctx.service()?;
    let request = PairRequest {
        source_id: args.source.clone(),
        candidate_id: args.candidate.clone(),
        profile: args.profile.clone(),
        as_of: args.as_of,
    };
    let matched = service.pair(&request)?;

    match ctx.output_format {
        OutputFormat::Json => emit_json(&robot_ok(&matched)),
        OutputFormat::Jsonl => emit_jsonl(std::slice::from_ref(&matched)),
        OutputFormat::Tsv => {
            emit_tsv(&MATCH_TSV_HEADERS, std::slice::from_ref(&matched), match_tsv_row);
            Ok(())
        }
        OutputFormat::Human => {
            let mut layout = HumanLayout::new();
            layout.title(&format!(
                "{} -> {} ({})",
                matched.matched.source_id, matched.matched.candidate_id, matched.matched.profile
            ));
            layout_match(&mut layout, &matched, ctx.output_format.use_colors(), true);
            emit_human(layout);
            Ok(())
        }
    }
}
