//! # api-snapshot CLI
//!
//! Review helpers for snapshot files:
//! - `pending`: list snapshots that still carry the review marker
//! - `check`: compare one snapshot with a JSON document
//!
//! Both commands exit with status 1 when there is something to act on
//! (pending snapshots, a mismatch) so they can gate CI jobs.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use api_snapshot::review::{check_file, find_pending};
use api_snapshot::SnapshotStore;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "api-snapshot",
    version,
    about = "Review snapshot files captured by api-snapshot assertions."
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List snapshot files that have not been reviewed yet.
    Pending {
        /// Directory to search for snapshot files.
        #[arg(default_value = "tests")]
        dir: PathBuf,
    },
    /// Compare a snapshot file with a JSON document.
    Check {
        /// The snapshot file.
        #[arg(required = true)]
        snapshot: PathBuf,
        /// The JSON document to compare against it.
        #[arg(required = true)]
        actual: PathBuf,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr, results to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Pending { dir } => {
            tracing::debug!("Searching for pending snapshots in {}", dir.display());
            let pending = find_pending(&dir)
                .with_context(|| format!("failed to scan {}", dir.display()))?;

            for path in &pending {
                println!("{}", path.display());
            }

            if pending.is_empty() {
                tracing::info!("No pending snapshots under {}", dir.display());
                Ok(ExitCode::SUCCESS)
            } else {
                tracing::info!("{} snapshot(s) waiting for review", pending.len());
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Check { snapshot, actual } => {
            let store = SnapshotStore::new();
            let report = check_file(&store, &snapshot, &actual).with_context(|| {
                format!(
                    "failed to compare {} with {}",
                    snapshot.display(),
                    actual.display()
                )
            })?;

            if report.is_match() {
                println!("{}", report.summary());
                Ok(ExitCode::SUCCESS)
            } else {
                println!("Snapshot is not equal. File {}", snapshot.display());
                print!("{report}");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
