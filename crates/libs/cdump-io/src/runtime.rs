//! The container runtime capability used by the dump engine.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use serde_json::Value;

use crate::prelude::*;

/// A running container carrying dump metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Runtime identifier.
    pub id: String,
    /// Human readable name. Used as the artifact name prefix.
    ///
    /// Runtimes that report several names for one container keep the first
    /// one listed, so artifacts are named after it.
    pub name: String,
}

impl Container {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Execution environment of a command run inside a container.
///
/// None of these are interpreted by cdump, they are handed to the runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Extra environment variables.
    pub env: BTreeMap<String, String>,
    /// Environment file read by the runtime.
    pub env_file: Option<String>,
    /// Attach our stdin to the command.
    pub interactive: bool,
    /// Allocate a pseudo-TTY.
    pub tty: bool,
    /// `user[:group]` to run as.
    pub user: Option<String>,
    /// Working directory inside the container.
    pub workdir: Option<String>,
}

/// What the dump engine needs from a container runtime.
///
/// Implementations are expected to block until each call completes.
pub trait Runtime {
    /// Running containers that carry dump metadata, in processing order.
    fn list_candidates(&self) -> Result<Vec<Container>>;

    /// The decoded job document of `container`, or [`Value::Null`] if there
    /// is none.
    fn metadata(&self, container: &Container) -> Result<Value>;

    /// Run `command` inside `container`, writing its stdout to `out` as it is
    /// produced. A non-zero exit status is an error.
    fn exec(
        &self,
        container: &Container,
        options: &ExecOptions,
        command: &[String],
        out: &mut dyn Write,
    ) -> Result<()>;
}
