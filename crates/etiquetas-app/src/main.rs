// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Etiquetas — product label generator
//
// Entry point. Parses the command line, initialises logging and dispatches to
// the commands module.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use etiquetas_core::human_errors::humanize_error;

/// Etiquetas - CSV rows in, Code 128 label PDF out
#[derive(Parser, Debug)]
#[command(name = "etiquetas")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a label PDF from a `;`-separated spreadsheet
    Generate(GenerateArgs),

    /// Write the reference spreadsheet template
    Template {
        /// Where to write the template
        #[arg(short, long, value_name = "FILE", default_value = "modelo_etiquetas.csv")]
        output: PathBuf,
    },

    /// Print the default configuration as JSON
    Config,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Input spreadsheet
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output PDF (defaults to the configured file name)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Abort on the first row with a missing value
    #[arg(long)]
    pub strict: bool,

    /// Encode barcodes on all cores
    #[arg(long)]
    pub parallel: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate(args) => commands::generate(&args).map(|report| report.print()),
        Commands::Template { output } => commands::write_template(&output),
        Commands::Config => commands::default_config_json().map(|json| println!("{json}")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            let human = humanize_error(&err);
            eprintln!("Error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
