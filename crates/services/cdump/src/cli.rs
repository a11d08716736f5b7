//! Command-line interface for cdump.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface for cdump.
#[derive(Parser)]
#[command(name = "cdump")]
#[command(about = "cdump - Dump command output of running containers into rotated files")]
pub struct Cli {
    /// Log debug messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Container runtime binary, overrides the settings file
    #[arg(long, global = true)]
    pub docker: Option<PathBuf>,

    /// Helper every runtime invocation is prefixed with, e.g. sudo
    #[arg(long, global = true)]
    pub sudo: Option<PathBuf>,

    /// Container label holding the job document
    #[arg(long, global = true)]
    pub label: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for cdump.
#[derive(Subcommand)]
pub enum Commands {
    /// Run every job of the schedule and write its output to DUMPDIR
    Run {
        /// Existing directory the artifacts are written to
        dumpdir: PathBuf,

        /// Schedule to run, e.g. daily
        schedule: String,

        /// Delete old artifacts beyond each job's keep count afterwards
        #[arg(short, long)]
        prune: bool,
    },
    /// List candidate containers and their jobs without running anything
    Jobs {
        /// Only show jobs of this schedule
        schedule: Option<String>,
    },
}
