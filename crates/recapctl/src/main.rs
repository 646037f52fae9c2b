//! Recap Control - CLI for the Recap scheduling pipeline
//!
//! Runs the adaptive learning pipeline on an answer-history snapshot and
//! renders the resulting report. Persistence stays with the caller: the
//! snapshot comes in as JSON, the updated SRS schedule goes out as JSON.

mod commands;
mod logging;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use recap_common::{ui, RecapError};
use tracing::Level;

#[derive(Parser)]
#[command(name = "recapctl")]
#[command(about = "Recap - adaptive interview-prep scheduling", long_about = None)]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Input snapshot JSON (answer history + prior SRS state)
    #[arg(long)]
    input: PathBuf,

    /// Optional TOML overrides for pipeline tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Clock override: epoch milliseconds or RFC 3339 (defaults to now)
    #[arg(long)]
    now: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and render the report
    Run {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Print the raw JSON report instead of the styled view
        #[arg(long)]
        json: bool,

        /// Write the updated SRS schedule to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show the due-for-review queue
    Due {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Show the recommended learning path
    Path {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Show the run summary only
    Report {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let started = Instant::now();
    let command = match &cli.command {
        Commands::Run { .. } => "run",
        Commands::Due { .. } => "due",
        Commands::Path { .. } => "path",
        Commands::Report { .. } => "report",
    };

    let result = match &cli.command {
        Commands::Run {
            snapshot,
            json,
            output,
        } => commands::run(
            &snapshot.input,
            snapshot.config.as_deref(),
            snapshot.now.as_deref(),
            *json,
            output.as_deref(),
        ),
        Commands::Due { snapshot } => commands::due(
            &snapshot.input,
            snapshot.config.as_deref(),
            snapshot.now.as_deref(),
        ),
        Commands::Path { snapshot } => commands::path(
            &snapshot.input,
            snapshot.config.as_deref(),
            snapshot.now.as_deref(),
        ),
        Commands::Report { snapshot } => commands::report(
            &snapshot.input,
            snapshot.config.as_deref(),
            snapshot.now.as_deref(),
        ),
    };

    logging::append_entry(command, started.elapsed(), &result);

    if let Err(err) = result {
        ui::print_err(&format!("{:#}", err));
        let code = err
            .downcast_ref::<RecapError>()
            .map(RecapError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}
