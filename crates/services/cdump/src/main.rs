//! cdump
//!
//! Runs the dump jobs that running containers declare in a label and writes
//! each job's output to a timestamped file, optionally rotating old files.
//!
//! # Usage
//!
//! A container declares its jobs under the `cdump.jobs` label:
//!
//! ```bash
//! docker run -d --name db \
//!     --label 'cdump.jobs={"jobs":[{"command":["pg_dumpall"],"schedules":["daily"],"extension":".sql","compress":true,"keep":7}]}' \
//!     postgres
//! ```
//!
//! Which is then dumped from cron:
//!
//! ```bash
//! cdump run /var/backups/containers daily --prune
//! ```

mod cli;
mod commands;
mod dump;
mod error;
mod prelude;
mod report;
#[cfg(test)]
mod testing;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{build_runtime, handle_jobs, handle_run, load_settings};
use crate::prelude::*;

const DEFAULT_FILTER: &str = "cdump=info,cdump_config=info,cdump_io=info,cdump_store=info";
const VERBOSE_FILTER: &str = "cdump=debug,cdump_config=debug,cdump_io=debug,cdump_store=debug";

/// Main entry point for cdump.
///
/// Initializes logging, resolves the settings, and dispatches to the command
/// handler. A run exits with a failure status when any job failed to dump.
///
/// # Examples
///
/// ```bash
/// # Show what would run
/// cdump jobs daily
///
/// # Dump through sudo with a custom label
/// cdump --sudo sudo --label backup.jobs run /srv/dumps weekly
/// ```
fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new(VERBOSE_FILTER)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_FILTER.into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let settings = load_settings(&cli)?;
    let runtime = build_runtime(&settings);

    match cli.command {
        Commands::Run {
            dumpdir,
            schedule,
            prune,
        } => {
            let report = handle_run(&runtime, &dumpdir, &schedule, prune)?;
            if report.has_failures() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Jobs { schedule } => handle_jobs(&runtime, schedule.as_deref(), io::stdout())?,
    }
    Ok(ExitCode::SUCCESS)
}
