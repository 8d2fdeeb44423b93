//! rapport batch - Rank the population against a source actor.

use chrono::{DateTime, Utc};
use clap::Args;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::cli::output::{
    HumanLayout, JsonlMatchSink, emit_human, emit_json, emit_tsv, robot_ok,
};
use crate::error::Result;
use crate::service::BatchRequest;

use super::{MATCH_TSV_HEADERS, layout_match, match_tsv_row, parse_as_of};

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Source actor id
    pub source: String,

    /// Weight profile (default: engine.default_profile)
    #[arg(long, short = 'p')]
    pub profile: Option<String>,

    /// Number of matches to return (default: engine.default_top_k)
    #[arg(long, short = 'k')]
    pub top_k: Option<usize>,

    /// Minimum total score (default: the profile's min_score)
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Only consider candidates with this persona (repeatable)
    #[arg(long = "persona", value_name = "PERSONA")]
    pub personas: Vec<String>,

    /// Reference instant for recency (RFC 3339 or YYYY-MM-DD; default: now)
    #[arg(long, value_parser = parse_as_of)]
    pub as_of: Option<DateTime<Utc>>,
}

pub fn run(ctx: &AppContext, args: &BatchArgs) -> Result<()> {
    let service = ctx.service()?;
    let request = BatchRequest {
        source_id: args.source.clone(),
        profile: args.profile.clone(),
        top_k: args.top_k,
        min_score: args.min_score,
        personas: args.personas.clone(),
        as_of: args.as_of,
    };
    if ctx.output_format == OutputFormat::Jsonl {
        let mut sink = JsonlMatchSink::new(std::io::stdout().lock());
        service.batch_into(&request, &mut sink)?;
        return Ok(());
    }
    let report = service.batch(&request)?;

    match ctx.output_format {
        OutputFormat::Json | OutputFormat::Jsonl => emit_json(&robot_ok(&report)),
        OutputFormat::Tsv => {
            emit_tsv(&MATCH_TSV_HEADERS, &report.matches, match_tsv_row);
            Ok(())
        }
        OutputFormat::Human => {
            let mut layout = HumanLayout::new();
            layout
                .title(&format!("Matches for {} ({})", report.source_id, report.profile))
                .kv("Population", &report.population.to_string())
                .kv("Eligible", &report.eligible.to_string())
                .kv("Pruned", &report.pruned.to_string())
                .kv("Scored", &report.scored.to_string())
                .blank();
            if report.matches.is_empty() {
                layout.push_line("No matches.");
            }
            for (rank, matched) in report.matches.iter().enumerate() {
                layout.section(&format!("#{}", rank + 1));
                layout_match(&mut layout, matched, ctx.output_format.use_colors(), false);
                layout.blank();
            }
            emit_human(layout);
            Ok(())
        }
    }
}
