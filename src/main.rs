//! rapport - explainable attendee and organization matching
//!
//! Score pairs, rank populations and record feedback from the command line.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use rapport::Result;
use rapport::app::AppContext;
use rapport::cli::output::robot_error_structured;
use rapport::cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = cli.output_format();
    init_tracing(&cli, format.is_machine_readable());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if format.is_machine_readable() {
                // Machine mode: structured JSON error on stdout
                let response = robot_error_structured(&e);
                println!("{}", serde_json::to_string(&response).unwrap_or_default());
            } else {
                let structured = e.to_structured();
                eprintln!("Error: {e}");
                eprintln!("  hint: {}", structured.suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Commands::Completions(args) = &cli.command {
        rapport::cli::commands::completions::run(args);
        return Ok(());
    }
    let ctx = AppContext::from_cli(cli)?;
    rapport::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli, machine: bool) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,rapport=info",
        1 => "info,rapport=debug",
        2 => "debug,rapport=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    if machine {
        // JSON logging for machine output
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
