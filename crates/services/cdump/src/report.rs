use std::fmt;

use crate::prelude::*;

/// A job whose dump did not produce an artifact.
#[derive(Debug)]
pub struct JobFailure {
    pub container: String,
    /// `None` when the container failed before any job was known.
    pub job: Option<String>,
    pub error: Error,
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.job {
            Some(job) => write!(f, "{} - {job}: {}", self.container, self.error),
            None => write!(f, "{}: {}", self.container, self.error),
        }
    }
}

/// Outcome of one dump run.
#[derive(Debug)]
pub struct DumpReport {
    pub schedule: String,
    pub containers: usize,
    pub dumped: usize,
    pub skipped: usize,
    pub pruned: usize,
    pub prune_failures: usize,
    pub failures: Vec<JobFailure>,
}

impl DumpReport {
    pub fn new(schedule: &str) -> Self {
        Self {
            schedule: schedule.to_string(),
            containers: 0,
            dumped: 0,
            skipped: 0,
            pruned: 0,
            prune_failures: 0,
            failures: Vec::new(),
        }
    }

    /// Whether any dump failed. Prune failures don't count.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl fmt::Display for DumpReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Schedule {}: {} containers, {} dumped, {} skipped, {} failed, {} pruned",
            self.schedule,
            self.containers,
            self.dumped,
            self.skipped,
            self.failures.len(),
            self.pruned
        )?;
        if self.prune_failures > 0 {
            write!(f, " ({} could not be pruned)", self.prune_failures)?;
        }
        Ok(())
    }
}
