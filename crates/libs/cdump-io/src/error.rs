//! Runtime and process error types.

use std::io;

/// Errors that can occur while talking to the container runtime.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed while streaming process output.
    #[error(transparent)]
    IO(#[from] io::Error),

    /// Runtime output could not be decoded as JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Failed to spawn the process.
    #[error("Failed to spawn {program} - {source}")]
    SpawnProcessFail { program: String, source: io::Error },

    /// The process stdout was not piped.
    #[error("Process stdout is not available")]
    StdoutUnavailable,

    /// The process exited with a non-zero status code.
    #[error("Command exited with status {0}")]
    NonZeroExit(i32),

    /// The process was terminated by a signal.
    #[error("Command was terminated by a signal")]
    Terminated,

    /// A runtime helper command failed.
    #[error("{program} failed ({status}) - {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The runtime printed something we could not make sense of.
    #[error("Unexpected runtime output: {0}")]
    UnexpectedOutput(String),
}
