//! # cstamp CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cstamp_cli::inspect::{run_decode, run_hash, DecodeArgs, HashArgs};
use cstamp_cli::keys::{run_keygen, KeygenArgs};
use cstamp_cli::stamp::{run_stamp, StampArgs};
use cstamp_cli::verify::{run_verify, VerifyArgs};

/// Create and verify signed cryptostamp tokens.
#[derive(Parser, Debug)]
#[command(name = "cstamp", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML stamp configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 key pair.
    Keygen(KeygenArgs),

    /// Create a signed stamp and print it as a token.
    Stamp(StampArgs),

    /// Verify a token.
    Verify(VerifyArgs),

    /// Print a token's head and envelope without verifying it.
    Decode(DecodeArgs),

    /// Print the canonical digest of a JSON document.
    Hash(HashArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

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

    let result = match cstamp_cli::load_config(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Keygen(args) => run_keygen(&args),
            Commands::Stamp(args) => run_stamp(&args, &config).await,
            Commands::Verify(args) => run_verify(&args, &config).await,
            Commands::Decode(args) => run_decode(&args),
            Commands::Hash(args) => run_hash(&args, &config),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
