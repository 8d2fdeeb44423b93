//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod output;

/// Rapport - explainable attendee and organization matching
#[derive(Parser, Debug)]
#[command(name = "rapport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (human, json, jsonl, tsv)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Machine-readable JSON output (shorthand for --output-format=json)
    #[arg(long, short = 'm', global = true)]
    pub machine: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/rapport/config.toml, then .rapport/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Actor file (.json, .jsonl, .yaml)
    #[arg(long, global = true)]
    pub actors: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective output format: `--output-format`, then `--machine`, then human.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if let Some(fmt) = self.output_format {
            return fmt;
        }
        if self.machine {
            return OutputFormat::Json;
        }
        OutputFormat::Human
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score one actor against another
    Pair(commands::pair::PairArgs),

    /// Rank the population against a source actor
    Batch(commands::batch::BatchArgs),

    /// List and inspect weight profiles
    Profiles(commands::profiles::ProfilesArgs),

    /// Record accept/reject feedback on a match
    Feedback(commands::feedback::FeedbackArgs),

    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}
