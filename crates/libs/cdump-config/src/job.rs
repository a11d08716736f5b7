//! Dump job definitions.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::lenient;

/// One entry of the `jobs` array, as found in container metadata.
#[derive(Debug, Default, Deserialize)]
struct JobEntry {
    #[serde(default, deserialize_with = "lenient::string_list")]
    command: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_set")]
    schedules: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    compress: bool,
    #[serde(default, deserialize_with = "lenient::or_default")]
    extension: String,
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    part: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    keep: u64,
    #[serde(default, deserialize_with = "lenient::string_map")]
    env: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    env_file: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    interactive: bool,
    #[serde(default, deserialize_with = "lenient::or_default")]
    tty: bool,
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    user: Option<String>,
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    workdir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct JobsDocument {
    #[serde(default, deserialize_with = "lenient::or_default")]
    jobs: Vec<Value>,
}

/// A dump job of one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    /// Name of the owning container. Prefix of every artifact of this job.
    pub name: String,
    /// Command executed inside the container. Empty means the job is skipped.
    pub command: Vec<String>,
    /// Schedules this job takes part in.
    pub schedules: BTreeSet<String>,
    /// Gzip the output.
    pub compress: bool,
    /// Artifact file extension, including the leading dot.
    pub extension: String,
    /// Optional part name, distinguishes several jobs of the same container.
    pub part: Option<String>,
    /// Number of artifacts kept when pruning. 0 keeps everything.
    pub keep: u64,
    /// Extra environment for the command.
    pub env: BTreeMap<String, String>,
    /// Environment file, resolved by the container runtime.
    pub env_file: Option<String>,
    /// Attach stdin to the command.
    pub interactive: bool,
    /// Allocate a TTY for the command.
    pub tty: bool,
    /// `user[:group]` the command runs as.
    pub user: Option<String>,
    /// Working directory of the command.
    pub workdir: Option<String>,
}

impl JobSpec {
    /// Parse one job entry owned by container `name`.
    ///
    /// Returns `None` if the entry is not an object. Fields with a missing or
    /// wrong-shaped value take their default.
    pub fn parse(name: &str, entry: &Value) -> Option<Self> {
        if !entry.is_object() {
            return None;
        }
        let entry = JobEntry::deserialize(entry).unwrap_or_default();
        Some(Self::from_entry(name, entry))
    }

    fn from_entry(name: &str, entry: JobEntry) -> Self {
        Self {
            name: name.to_string(),
            command: entry.command,
            schedules: entry.schedules,
            compress: entry.compress,
            extension: entry.extension,
            part: entry.part,
            keep: entry.keep,
            env: entry.env,
            env_file: entry.env_file,
            interactive: entry.interactive,
            tty: entry.tty,
            user: entry.user,
            workdir: entry.workdir,
        }
    }

    /// Whether this job runs on `schedule`.
    pub fn in_schedule(&self, schedule: &str) -> bool {
        self.schedules.contains(schedule)
    }
}

impl fmt::Display for JobSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(part) = &self.part {
            write!(f, " ({part})")?;
        }
        let schedules: Vec<&str> = self.schedules.iter().map(String::as_str).collect();
        write!(f, " [{}] {}", schedules.join(","), self.command.join(" "))
    }
}

/// Parse the jobs of container `name` from its decoded metadata document.
///
/// Entries that are not objects are dropped with a warning. A document
/// without a `jobs` array has no jobs.
pub fn parse_jobs(name: &str, document: &Value) -> Vec<JobSpec> {
    if !document.is_object() {
        return Vec::new();
    }
    let document = JobsDocument::deserialize(document).unwrap_or_default();
    document
        .jobs
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let job = JobSpec::parse(name, entry);
            if job.is_none() {
                warn!("{name} - Ignoring job {idx}: not an object");
            }
            job
        })
        .collect()
}
