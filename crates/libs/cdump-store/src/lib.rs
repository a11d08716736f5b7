//! Dump artifact storage for cdump.
//!
//! A [`DumpRepository`] owns the artifacts of one job inside a dump
//! directory. Artifacts are named
//! `{name}-{timestamp}[-{part}]{extension}[.gz]`. The timestamp in the name
//! orders artifacts by age, which is what [`DumpRepository::prune`] relies
//! on.
//!
//! Writes go through a [`DumpWriter`]: bytes land in a temporary file next
//! to the artifact and only [`DumpWriter::commit`] moves them under the final
//! name. A dump that fails half way never shows up as an artifact.
//!
//! # Usage
//!
//! ```rust
//! use cdump_store::{ArtifactName, DumpRepository, Timestamp};
//! use std::io::Write;
//!
//! # fn main() -> cdump_store::prelude::Result<()> {
//! # let dir = tempfile::tempdir()?;
//! let repository = DumpRepository::new(dir.path(), ArtifactName::new("db").extension(".sql"));
//!
//! let mut writer = repository.open_for_write(&Timestamp::now())?;
//! writer.write_all(b"CREATE TABLE t ();\n")?;
//! writer.commit()?;
//!
//! assert_eq!(repository.list_artifacts()?.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod prelude;
pub mod repository;
pub mod timestamp;
pub mod writer;

pub use repository::{ArtifactName, DumpRepository, PruneReport};
pub use timestamp::Timestamp;
pub use writer::DumpWriter;
