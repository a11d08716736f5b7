//! The dump run.
//!
//! One run handles every candidate container in the order the runtime lists
//! them:
//!
//! 1. Takes one timestamp shared by all jobs of the container
//! 2. Parses the container's jobs and keeps those of the requested schedule
//! 3. Runs each job in declared order, streaming its output into an artifact
//! 4. Prunes the artifacts of those jobs once all of them were attempted
//!
//! A job that fails is logged and recorded in the [`DumpReport`], the run
//! carries on with the next job.

use std::path::PathBuf;

use cdump_config::{JobSpec, parse_jobs};
use cdump_io::runtime::{Container, ExecOptions, Runtime};
use cdump_store::{ArtifactName, DumpRepository, Timestamp};
use tracing::{debug, error, info, warn};

use crate::prelude::*;
use crate::report::{DumpReport, JobFailure};

/// Runs the jobs of a schedule against a container runtime.
pub struct Dumper<'a, R: Runtime + ?Sized> {
    runtime: &'a R,
    dumpdir: PathBuf,
    prune: bool,
}

impl<'a, R: Runtime + ?Sized> Dumper<'a, R> {
    pub fn new(runtime: &'a R, dumpdir: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            dumpdir: dumpdir.into(),
            prune: false,
        }
    }

    /// Prune the artifacts of every selected job after dumping.
    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// Run every job of `schedule` once.
    ///
    /// Only failing to list the candidate containers aborts the run, any
    /// other failure ends up in the report.
    pub fn run(&self, schedule: &str) -> Result<DumpReport> {
        let containers = self.runtime.list_candidates()?;
        info!(
            "Schedule {schedule}: {} candidate containers",
            containers.len()
        );

        let mut report = DumpReport::new(schedule);
        for container in &containers {
            report.containers += 1;
            self.dump_container(container, schedule, &mut report);
        }
        Ok(report)
    }

    fn dump_container(&self, container: &Container, schedule: &str, report: &mut DumpReport) {
        let timestamp = Timestamp::now();

        let document = match self.runtime.metadata(container) {
            Ok(document) => document,
            Err(err) => {
                error!("{container} - Failed to read job metadata - {err}");
                report.failures.push(JobFailure {
                    container: container.name.clone(),
                    job: None,
                    error: err.into(),
                });
                return;
            }
        };

        let jobs: Vec<JobSpec> = parse_jobs(&container.name, &document)
            .into_iter()
            .filter(|job| job.in_schedule(schedule))
            .collect();
        if jobs.is_empty() {
            debug!("{container} - No jobs for schedule {schedule}");
            return;
        }
        debug!("{container} - {} jobs for schedule {schedule}", jobs.len());

        let repositories: Vec<DumpRepository> = jobs
            .iter()
            .map(|job| DumpRepository::new(&self.dumpdir, artifact_name(job)))
            .collect();

        for (job, repository) in jobs.iter().zip(&repositories) {
            match self.dump_job(container, job, repository, &timestamp) {
                Ok(Some(path)) => {
                    info!("{container} - Dumped {}", path.display());
                    report.dumped += 1;
                }
                Ok(None) => report.skipped += 1,
                Err(err) => {
                    error!("{container} - Dump of {job} failed - {err}");
                    report.failures.push(JobFailure {
                        container: container.name.clone(),
                        job: Some(job.to_string()),
                        error: err,
                    });
                }
            }
        }

        if !self.prune {
            return;
        }
        for (job, repository) in jobs.iter().zip(&repositories) {
            match repository.prune(job.keep) {
                Ok(pruned) => {
                    if !pruned.removed.is_empty() {
                        info!(
                            "{container} - Pruned {} artifacts of {job}",
                            pruned.removed.len()
                        );
                    }
                    report.pruned += pruned.removed.len();
                    report.prune_failures += pruned.failed.len();
                }
                Err(err) => {
                    warn!("{container} - Failed to prune {job} - {err}");
                    report.prune_failures += 1;
                }
            }
        }
    }

    /// Dump one job. `Ok(None)` means the job was skipped.
    fn dump_job(
        &self,
        container: &Container,
        job: &JobSpec,
        repository: &DumpRepository,
        timestamp: &Timestamp,
    ) -> Result<Option<PathBuf>> {
        if job.command.is_empty() {
            warn!("{container} - Skipping {job}: no command");
            return Ok(None);
        }

        let mut writer = repository.open_for_write(timestamp)?;
        self.runtime
            .exec(container, &exec_options(job), &job.command, &mut writer)?;
        debug!(
            "{container} - {job} produced {} bytes",
            writer.bytes_written()
        );
        Ok(Some(writer.commit()?))
    }
}

fn artifact_name(job: &JobSpec) -> ArtifactName {
    ArtifactName {
        name: job.name.clone(),
        compress: job.compress,
        extension: job.extension.clone(),
        part: job.part.clone(),
    }
}

fn exec_options(job: &JobSpec) -> ExecOptions {
    ExecOptions {
        env: job.env.clone(),
        env_file: job.env_file.clone(),
        interactive: job.interactive,
        tty: job.tty,
        user: job.user.clone(),
        workdir: job.workdir.clone(),
    }
}
