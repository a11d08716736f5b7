//! Storage error types.

use std::path::PathBuf;

/// Storage errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// Another dump of the same round already produced this artifact.
    #[error("Artifact {0} already exists")]
    ArtifactExists(PathBuf),
}
