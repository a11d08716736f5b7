//! Artifact naming, listing and rotation.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::prelude::*;
use crate::timestamp::Timestamp;
use crate::writer::DumpWriter;

/// The parts of a job that determine its artifact names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    /// Artifact prefix, the owning container name.
    pub name: String,
    /// Artifacts are gzipped and carry a `.gz` suffix.
    pub compress: bool,
    /// Extension placed after the timestamp and part.
    pub extension: String,
    /// Optional part placed after the timestamp.
    pub part: Option<String>,
}

impl ArtifactName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            compress: false,
            extension: String::new(),
            part: None,
        }
    }

    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn part(mut self, part: impl Into<String>) -> Self {
        self.part = Some(part.into());
        self
    }

    fn suffix(&self) -> String {
        if self.compress {
            format!("{}.gz", self.extension)
        } else {
            self.extension.clone()
        }
    }

    /// `{name}-{timestamp}[-{part}]{extension}[.gz]`
    pub fn file_name(&self, timestamp: &Timestamp) -> String {
        let part = match &self.part {
            Some(part) => format!("-{part}"),
            None => String::new(),
        };
        format!("{}-{timestamp}{part}{}", self.name, self.suffix())
    }

    /// Whether `file_name` is an artifact of exactly this name.
    ///
    /// The middle has to be a well-formed timestamp, so that jobs of the same
    /// container with a different part, a longer container name sharing the
    /// prefix, or stray files never match.
    pub fn matches(&self, file_name: &str) -> bool {
        self.timestamp_of(file_name).is_some()
    }

    /// The timestamp embedded in `file_name`, if it is one of our artifacts.
    pub fn timestamp_of(&self, file_name: &str) -> Option<Timestamp> {
        let suffix = self.suffix();
        let rest = file_name
            .strip_prefix(self.name.as_str())?
            .strip_prefix('-')?
            .strip_suffix(suffix.as_str())?;
        let stamp = match &self.part {
            Some(part) => rest.strip_suffix(part.as_str())?.strip_suffix('-')?,
            None => rest,
        };
        Timestamp::parse(stamp)
    }
}

/// Outcome of a [`DumpRepository::prune`] call.
#[derive(Debug, Default)]
pub struct PruneReport {
    /// Artifacts deleted, oldest first.
    pub removed: Vec<PathBuf>,
    /// Artifacts that could not be deleted.
    pub failed: Vec<(PathBuf, io::Error)>,
}

/// The artifacts of one job inside a dump directory.
#[derive(Debug, Clone)]
pub struct DumpRepository {
    dumpdir: PathBuf,
    artifact: ArtifactName,
}

impl DumpRepository {
    pub fn new(dumpdir: impl Into<PathBuf>, artifact: ArtifactName) -> Self {
        Self {
            dumpdir: dumpdir.into(),
            artifact,
        }
    }

    /// Path of the artifact taken at `timestamp`.
    pub fn path_for(&self, timestamp: &Timestamp) -> PathBuf {
        self.dumpdir.join(self.artifact.file_name(timestamp))
    }

    /// Existing artifacts, oldest first.
    ///
    /// Ordered by the instant in the name rather than the name itself, names
    /// taken on either side of a UTC offset change don't sort by age.
    pub fn list_artifacts(&self) -> Result<Vec<PathBuf>> {
        let mut artifacts = Vec::new();
        for entry in fs::read_dir(&self.dumpdir)? {
            let entry = entry?;
            let path = entry.path();
            let timestamp = entry
                .file_name()
                .to_str()
                .and_then(|name| self.artifact.timestamp_of(name));
            if let Some(timestamp) = timestamp.filter(|_| path.is_file()) {
                artifacts.push((timestamp, path));
            }
        }
        artifacts.sort();
        Ok(artifacts.into_iter().map(|(_, path)| path).collect())
    }

    /// Start writing the artifact taken at `timestamp`.
    pub fn open_for_write(&self, timestamp: &Timestamp) -> Result<DumpWriter> {
        DumpWriter::create(&self.artifact.name, self.path_for(timestamp), self.artifact.compress)
    }

    /// Delete all but the `keep` most recent artifacts.
    ///
    /// `keep == 0` retains everything. Each deletion is attempted even if an
    /// earlier one failed.
    pub fn prune(&self, keep: u64) -> Result<PruneReport> {
        if keep == 0 {
            debug!("{} - Unlimited retention, nothing to prune", self.artifact.name);
            return Ok(PruneReport::default());
        }

        let artifacts = self.list_artifacts()?;
        let keep = usize::try_from(keep).unwrap_or(usize::MAX);
        let excess = artifacts.len().saturating_sub(keep);
        Ok(remove_all(artifacts.into_iter().take(excess)))
    }
}

/// Delete every path, carrying on past failures.
fn remove_all(paths: impl IntoIterator<Item = PathBuf>) -> PruneReport {
    let mut report = PruneReport::default();
    for path in paths {
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed {}", path.display());
                report.removed.push(path);
            }
            Err(err) => {
                warn!("Failed to remove {} - {err}", path.display());
                report.failed.push((path, err));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn ts(hour: u32) -> Timestamp {
        FixedOffset::east_opt(0)
            .and_then(|tz| tz.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).single())
            .map(Timestamp::from)
            .expect("valid test date")
    }

    #[test]
    fn file_name_with_part_and_extension() {
        let name = ArtifactName::new("db").extension(".sql").part("schema");
        assert_eq!(name.file_name(&ts(3)), "db-20240501T030000+0000-schema.sql");
    }

    #[test]
    fn file_name_compressed() {
        let name = ArtifactName::new("db").extension(".sql").compress(true);
        assert_eq!(name.file_name(&ts(3)), "db-20240501T030000+0000.sql.gz");

        let name = ArtifactName::new("db").compress(true);
        assert_eq!(name.file_name(&ts(3)), "db-20240501T030000+0000.gz");
    }

    #[test]
    fn file_name_bare() {
        assert_eq!(ArtifactName::new("c1").file_name(&ts(0)), "c1-20240501T000000+0000");
    }

    #[test]
    fn path_for_joins_dumpdir() {
        let repository = DumpRepository::new("/var/dumps", ArtifactName::new("c1").extension(".txt"));
        assert_eq!(
            repository.path_for(&ts(1)),
            PathBuf::from("/var/dumps/c1-20240501T010000+0000.txt")
        );
    }

    #[test]
    fn matches_own_names_only() {
        let plain = ArtifactName::new("db").extension(".sql");
        let schema = ArtifactName::new("db").extension(".sql").part("schema");
        let gz = ArtifactName::new("db").extension(".sql").compress(true);

        let plain_file = plain.file_name(&ts(1));
        let schema_file = schema.file_name(&ts(1));
        let gz_file = gz.file_name(&ts(1));

        assert!(plain.matches(&plain_file));
        assert!(!plain.matches(&schema_file));
        assert!(!plain.matches(&gz_file));

        assert!(schema.matches(&schema_file));
        assert!(!schema.matches(&plain_file));

        assert!(gz.matches(&gz_file));
        assert!(!gz.matches(&plain_file));
    }

    #[test]
    fn matches_rejects_lookalikes() {
        let name = ArtifactName::new("db").extension(".sql");

        assert!(!name.matches("db-replica-20240501T010000+0000.sql"));
        assert!(!name.matches("db-latest.sql"));
        assert!(!name.matches(".db-abc123.tmp"));
        assert!(!name.matches("db-20240501T010000+0000.sql.bak"));
    }

    #[test]
    fn timestamp_of_reads_the_name() {
        let name = ArtifactName::new("db").extension(".sql").part("schema");
        assert_eq!(name.timestamp_of(&name.file_name(&ts(7))), Some(ts(7)));
        assert_eq!(name.timestamp_of("db-20240501T070000+0000.sql"), None);
    }

    #[test]
    fn remove_all_carries_on_past_failures() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let first = dir.path().join("c1-a");
        let vanished = dir.path().join("c1-b");
        let last = dir.path().join("c1-c");
        fs::write(&first, b"x")?;
        fs::write(&last, b"x")?;

        let report = remove_all([first.clone(), vanished.clone(), last.clone()]);

        assert_eq!(report.removed, vec![first.clone(), last.clone()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, vanished);
        assert_eq!(report.failed[0].1.kind(), io::ErrorKind::NotFound);
        assert!(!first.exists());
        assert!(!last.exists());
        Ok(())
    }
}
