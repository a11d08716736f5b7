//! Command handlers for cdump.
//!
//! Contains handler functions for the CLI commands:
//! - Settings resolution and runtime construction
//! - A dump run
//! - Job listing

use std::io::Write;
use std::path::Path;

use cdump_config::{Settings, parse_jobs};
use cdump_io::docker::DockerRuntime;
use cdump_io::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::cli::Cli;
use crate::dump::Dumper;
use crate::prelude::*;
use crate::report::DumpReport;

/// Load the settings file, if any, and apply the CLI overrides on top.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    if let Some(docker) = &cli.docker {
        settings.docker = docker.clone();
    }
    if let Some(sudo) = &cli.sudo {
        settings.sudo = Some(sudo.clone());
    }
    if let Some(label) = &cli.label {
        settings.label = label.clone();
    }
    debug!("Using settings {settings:?}");
    Ok(settings)
}

pub fn build_runtime(settings: &Settings) -> DockerRuntime {
    DockerRuntime::new(
        settings.docker.clone(),
        settings.sudo.clone(),
        settings.label.clone(),
    )
}

/// Handles the run command: dump every job of `schedule` into `dumpdir`.
pub fn handle_run<R: Runtime + ?Sized>(
    runtime: &R,
    dumpdir: &Path,
    schedule: &str,
    prune: bool,
) -> Result<DumpReport> {
    if !dumpdir.is_dir() {
        return Err(Error::DumpDirMissing(dumpdir.to_path_buf()));
    }
    let report = Dumper::new(runtime, dumpdir).with_prune(prune).run(schedule)?;
    info!("{report}");
    Ok(report)
}

/// Handles the jobs command: list candidate containers and their jobs.
pub fn handle_jobs<R: Runtime + ?Sized>(
    runtime: &R,
    schedule: Option<&str>,
    mut out: impl Write,
) -> Result<()> {
    let containers = runtime.list_candidates()?;
    writeln!(out, "Number of containers: {}", containers.len())?;

    for (container_idx, container) in containers.iter().enumerate() {
        writeln!(out, "\nContainer {}: {}", container_idx + 1, container.name)?;
        writeln!(out, "  Id: {}", container.id)?;

        let document = match runtime.metadata(container) {
            Ok(document) => document,
            Err(err) => {
                warn!("{container} - Failed to read jobs - {err}");
                writeln!(out, "  Jobs: unavailable")?;
                continue;
            }
        };
        let jobs = parse_jobs(&container.name, &document);
        let jobs: Vec<_> = jobs
            .iter()
            .filter(|job| schedule.is_none_or(|schedule| job.in_schedule(schedule)))
            .collect();
        writeln!(out, "  Jobs: {}", jobs.len())?;

        for (job_idx, job) in jobs.iter().enumerate() {
            writeln!(out, "    Job {}: {job}", job_idx + 1)?;
            writeln!(out, "      Compress: {}", job.compress)?;
            writeln!(out, "      Extension: {:?}", job.extension)?;
            writeln!(out, "      Keep: {}", job.keep)?;
            if let Some(user) = &job.user {
                writeln!(out, "      User: {user}")?;
            }
            if let Some(workdir) = &job.workdir {
                writeln!(out, "      Workdir: {workdir}")?;
            }
            if !job.env.is_empty() {
                let keys: Vec<&str> = job.env.keys().map(String::as_str).collect();
                writeln!(out, "      Env: {}", keys.join(", "))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use clap::Parser;
    use serde_json::json;

    use crate::testing::FakeRuntime;

    #[test]
    fn cli_overrides_settings_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = dir.path().join("cdump.toml");
        std::fs::write(&config, "docker = \"/usr/bin/docker\"\nlabel = \"file.jobs\"\n")?;
        let config = config.to_string_lossy().into_owned();

        let cli = Cli::parse_from(["cdump", "--config", &config, "--label", "cli.jobs", "jobs"]);
        let settings = load_settings(&cli)?;

        assert_eq!(settings.docker, PathBuf::from("/usr/bin/docker"));
        assert_eq!(settings.label, "cli.jobs");
        assert_eq!(settings.sudo, None);
        Ok(())
    }

    #[test]
    fn settings_default_without_file() -> Result<()> {
        let cli = Cli::parse_from(["cdump", "--sudo", "sudo", "run", "/tmp", "daily"]);
        let settings = load_settings(&cli)?;

        assert_eq!(settings.sudo, Some(PathBuf::from("sudo")));
        assert_eq!(settings.label, Settings::default().label);
        Ok(())
    }

    #[test]
    fn missing_settings_file() {
        let cli = Cli::parse_from(["cdump", "--config", "/nonexistent/cdump.toml", "jobs"]);
        assert!(matches!(load_settings(&cli), Err(Error::Config(_))));
    }

    #[test]
    fn run_requires_dumpdir() {
        let runtime = FakeRuntime::new();
        let result = handle_run(&runtime, Path::new("/nonexistent/dumps"), "daily", false);

        assert!(matches!(result, Err(Error::DumpDirMissing(_))));
    }

    #[test]
    fn run_reports_failures() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let runtime = FakeRuntime::new()
            .container("c1", json!({"jobs": [{"command": "fail", "schedules": "daily"}]}));

        let report = handle_run(&runtime, dir.path(), "daily", false)?;

        assert!(report.has_failures());
        Ok(())
    }

    #[test]
    fn jobs_listing() -> Result<()> {
        let runtime = FakeRuntime::new().container(
            "db",
            json!({"jobs": [
                {"command": ["pg_dumpall"], "schedules": "daily", "extension": ".sql", "keep": 3, "user": "postgres"},
                {"command": ["echo", "weekly"], "schedules": "weekly"}
            ]}),
        );
        let mut out = Vec::new();

        handle_jobs(&runtime, Some("daily"), &mut out)?;

        let out = String::from_utf8_lossy(&out);
        assert!(out.contains("Container 1: db"));
        assert!(out.contains("Jobs: 1"));
        assert!(out.contains("Job 1: db [daily] pg_dumpall"));
        assert!(out.contains("Keep: 3"));
        assert!(out.contains("User: postgres"));
        assert!(!out.contains("weekly"));
        assert!(runtime.commands().is_empty());
        Ok(())
    }

    #[test]
    fn jobs_listing_survives_broken_container() -> Result<()> {
        let runtime = FakeRuntime::new()
            .broken_container("gone")
            .container("c1", json!({"jobs": [{"command": ["echo", "hi"]}]}));
        let mut out = Vec::new();

        handle_jobs(&runtime, None, &mut out)?;

        let out = String::from_utf8_lossy(&out);
        assert!(out.contains("Number of containers: 2"));
        assert!(out.contains("Jobs: unavailable"));
        assert!(out.contains("Job 1: c1 [] echo hi"));
        Ok(())
    }
}
