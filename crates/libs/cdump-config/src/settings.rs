//! Runtime access settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prelude::*;

/// Label holding the job document when none is configured.
pub const DEFAULT_LABEL: &str = "cdump.jobs";

/// Container runtime binary when none is configured.
pub const DEFAULT_DOCKER: &str = "docker";

/// Settings loaded from the optional TOML configuration file.
///
/// ```toml
/// docker = "/usr/bin/docker"
/// sudo = "/usr/bin/sudo"
/// label = "cdump.jobs"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Container runtime binary.
    pub docker: PathBuf,
    /// Helper every runtime invocation is prefixed with, e.g. `sudo`.
    pub sudo: Option<PathBuf>,
    /// Container label holding the job document.
    pub label: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            docker: PathBuf::from(DEFAULT_DOCKER),
            sudo: None,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        debug!("Loading settings from {}", file_path.display());
        let contents = std::fs::read_to_string(file_path)?;
        Self::from_toml(&contents)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(value: &str) -> Result<Self> {
        Ok(toml::from_str(value)?)
    }
}
