//! rapport profiles - List and inspect weight profiles.

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::cli::output::{HumanLayout, emit_human, emit_json, emit_jsonl, emit_tsv, robot_ok};
use crate::error::Result;
use crate::scoring::WeightProfile;

#[derive(Args, Debug)]
pub struct ProfilesArgs {
    #[command(subcommand)]
    pub command: ProfilesCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProfilesCommand {
    /// List available profiles
    List,
    /// Show one profile's signals and weights
    Show(ProfileShowArgs),
}

#[derive(Args, Debug)]
pub struct ProfileShowArgs {
    /// Profile name
    pub name: String,
}

#[derive(Debug, Serialize)]
struct ProfileSummary<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    signals: usize,
    min_score: f64,
    is_default: bool,
}

pub fn run(ctx: &AppContext, args: &ProfilesArgs) -> Result<()> {
    match &args.command {
        ProfilesCommand::List => run_list(ctx),
        ProfilesCommand::Show(show) => run_show(ctx, show),
    }
}

fn run_list(ctx: &AppContext) -> Result<()> {
    let default = ctx.config.engine.default_profile.as_str();
    let summaries: Vec<ProfileSummary<'_>> = ctx
        .profiles
        .iter()
        .map(|profile| ProfileSummary {
            name: &profile.name,
            description: profile.description.as_deref(),
            signals: profile.signals.len(),
            min_score: profile.min_score,
            is_default: profile.name == default,
        })
        .collect();

    match ctx.output_format {
        OutputFormat::Json => emit_json(&robot_ok(&summaries)),
        OutputFormat::Jsonl => emit_jsonl(&summaries),
        OutputFormat::Tsv => {
            emit_tsv(&["name", "signals", "min_score", "default"], &summaries, |s| {
                vec![
                    s.name.to_string(),
                    s.signals.to_string(),
                    s.min_score.to_string(),
                    s.is_default.to_string(),
                ]
            });
            Ok(())
        }
        OutputFormat::Human => {
            let mut layout = HumanLayout::new();
            layout.title("Weight Profiles");
            for summary in &summaries {
                let marker = if summary.is_default { " (default)" } else { "" };
                layout.kv(
                    summary.name,
                    &format!(
                        "{} signals{marker}  {}",
                        summary.signals,
                        summary.description.unwrap_or_default()
                    ),
                );
            }
            emit_human(layout);
            Ok(())
        }
    }
}

fn run_show(ctx: &AppContext, args: &ProfileShowArgs) -> Result<()> {
    let profile = ctx.profiles.get(&args.name)?;
    match ctx.output_format {
        OutputFormat::Json => emit_json(&robot_ok(profile)),
        OutputFormat::Jsonl => emit_jsonl(std::slice::from_ref(profile)),
        OutputFormat::Tsv => {
            let rows: Vec<(&String, &crate::scoring::SignalSpec)> = profile.signals.iter().collect();
            emit_tsv(&["signal", "metric", "weight"], &rows, |(name, spec)| {
                vec![
                    (*name).clone(),
                    spec.metric.to_string(),
                    spec.weight.to_string(),
                ]
            });
            Ok(())
        }
        OutputFormat::Human => {
            emit_human(profile_layout(profile));
            Ok(())
        }
    }
}

fn profile_layout(profile: &WeightProfile) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title(&format!("Profile: {}", profile.name));
    if let Some(description) = &profile.description {
        layout.push_line(description.clone()).blank();
    }
    layout.kv("Min score", &profile.min_score.to_string());
    if !profile.candidate_personas.is_empty() {
        layout.kv("Personas", &profile.candidate_personas.join(", "));
    }
    if profile.same_region {
        layout.kv("Region", "same region only");
    }
    layout.blank().section("Signals");
    for (name, spec) in &profile.signals {
        layout.kv(name, &format!("{} x {}", spec.metric, spec.weight));
    }
    layout
}
