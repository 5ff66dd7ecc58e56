//! # compa CLI entry point
//!
//! Parses command-line arguments, loads configuration, initialises logging,
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use compa_cli::batch::{run_batch, BatchArgs};
use compa_cli::calc::{run_calc, CalcArgs};
use compa_cli::config::{CompaConfig, LogFormat};
use compa_cli::matrix::{run_matrix, MatrixArgs};
use compa_cli::rating::{run_rating, RatingArgs};

/// Compa-ratio salary adjustment engine.
///
/// Computes salary increases from an employee's compa-ratio, performance
/// rating, and tenure using a per-tenant adjustment matrix.
#[derive(Parser, Debug)]
#[command(name = "compa", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute one employee's salary adjustment.
    Calc(CalcArgs),

    /// Process an uploaded sheet of employees.
    Batch(BatchArgs),

    /// Default table, validation, and band lookup.
    Matrix(MatrixArgs),

    /// Convert a performance rating between scales.
    Rating(RatingArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = CompaConfig::load(cli.config.as_deref());
    let format = config
        .as_ref()
        .map(|c| c.log_format)
        .unwrap_or_default();
    init_tracing(cli.verbose, format);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(?config, "compa CLI starting");

    let result = match cli.command {
        Commands::Calc(args) => run_calc(&args, &config),
        Commands::Batch(args) => run_batch(&args, &config),
        Commands::Matrix(args) => run_matrix(&args),
        Commands::Rating(args) => run_rating(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins when set and no `-v` was given.
fn init_tracing(verbose: u8, format: LogFormat) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
