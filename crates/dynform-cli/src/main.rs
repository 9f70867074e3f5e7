//! # dynform CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dynform_cli::schema::{run_check_schema, CheckSchemaArgs};
use dynform_cli::submit::{run_fingerprint, run_validate, FingerprintArgs, ValidateArgs};

/// Dynamic forms toolchain.
///
/// Checks form schema documents, validates submissions offline, and
/// computes the SHA-256 fingerprints used for duplicate detection.
#[derive(Parser, Debug)]
#[command(name = "dynform", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest a form schema document and report every problem found.
    CheckSchema(CheckSchemaArgs),

    /// Validate a submission against a form schema.
    Validate(ValidateArgs),

    /// Compute the fingerprint of normalized submission data.
    Fingerprint(FingerprintArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::CheckSchema(args) => run_check_schema(&args),
        Commands::Validate(args) => run_validate(&args),
        Commands::Fingerprint(args) => run_fingerprint(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
