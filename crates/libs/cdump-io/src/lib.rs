//! Container runtime access for cdump.
//!
//! [`runtime::Runtime`] is the capability the dump engine needs from a
//! container runtime: list candidate containers, read their job metadata and
//! execute a command inside one of them while streaming its stdout.
//! [`docker::DockerRuntime`] implements it on top of the `docker` CLI, using
//! the blocking process helpers in [`process`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use cdump_io::docker::DockerRuntime;
//! use cdump_io::runtime::{ExecOptions, Runtime};
//!
//! let runtime = DockerRuntime::new("docker", None, "cdump.jobs");
//! for container in runtime.list_candidates()? {
//!     let mut out = Vec::new();
//!     let command = vec![String::from("date")];
//!     runtime.exec(&container, &ExecOptions::default(), &command, &mut out)?;
//!     println!("{}: {}", container.name, String::from_utf8_lossy(&out));
//! }
//! # Ok::<(), cdump_io::error::Error>(())
//! ```

pub mod docker;
pub mod error;
pub mod prelude;
pub mod process;
pub mod runtime;
