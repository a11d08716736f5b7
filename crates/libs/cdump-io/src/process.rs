//! Blocking process management utilities.

use std::{
    ffi::OsStr,
    io::{self, Write},
    process::{Child, Command, ExitStatus, Stdio},
};

use tracing::debug;

use crate::prelude::*;

/// Spawn a new process with piped stdout.
///
/// stderr is inherited so the output of the process ends up next to ours.
/// stdin is whatever the caller asks for, usually [`Stdio::null`].
///
/// # Examples
///
/// ```rust
/// use cdump_io::process::spawn_process;
/// use std::process::Stdio;
///
/// let mut child = spawn_process("echo", ["Hello"], Stdio::null()).unwrap();
/// let status = child.wait().unwrap();
/// assert!(status.success());
/// ```
pub fn spawn_process<I, S>(program: impl AsRef<OsStr>, args: I, stdin: Stdio) -> Result<Child>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    Command::new(program)
        .args(args)
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| Error::SpawnProcessFail {
            program: program.to_string_lossy().into_owned(),
            source,
        })
}

/// Copy the stdout of `child` into `out` until EOF, then wait for it.
///
/// Bytes are forwarded as they arrive, nothing is buffered wholesale.
/// Returns the number of bytes copied. A copy failure takes precedence over
/// the exit status, a non-zero exit is reported as [`Error::NonZeroExit`].
pub fn stream_output(child: &mut Child, out: &mut dyn Write) -> Result<u64> {
    let mut stdout = child.stdout.take().ok_or(Error::StdoutUnavailable)?;
    let copied = io::copy(&mut stdout, out);
    // Closing our end unblocks a child still writing after a failed copy.
    drop(stdout);
    let status = child.wait()?;

    let copied = copied?;
    check_exit_status(status)?;
    debug!("Process {} wrote {copied} bytes", child.id());
    Ok(copied)
}

/// Map an exit status to `Ok(())` or the matching error.
pub fn check_exit_status(status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(Error::NonZeroExit(code)),
        None => Err(Error::Terminated),
    }
}

/// Run a short helper command to completion and return its stdout.
///
/// Used for runtime queries whose output is small. stderr is captured and
/// included in the error on failure.
pub fn capture_output<I, S>(program: impl AsRef<OsStr>, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| Error::SpawnProcessFail {
            program: program.to_string_lossy().into_owned(),
            source,
        })?;

    if !output.status.success() {
        return Err(Error::CommandFailed {
            program: program.to_string_lossy().into_owned(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
