//! [`Runtime`] implementation driving the `docker` CLI.
//!
//! Any CLI compatible with `docker ps`, `docker inspect` and `docker exec`
//! works, e.g. `podman`. An optional helper such as `sudo` can be prefixed to
//! every invocation.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;

use serde_json::Value;
use tracing::{debug, warn};

use crate::prelude::*;
use crate::process::{capture_output, spawn_process, stream_output};
use crate::runtime::{Container, ExecOptions, Runtime};

/// Container runtime reached through the `docker` command line.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: PathBuf,
    sudo: Option<PathBuf>,
    label: String,
}

impl DockerRuntime {
    /// Create a runtime calling `docker`, prefixed with `sudo` if set, that
    /// reads job documents from the container label `label`.
    pub fn new(docker: impl Into<PathBuf>, sudo: Option<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            docker: docker.into(),
            sudo,
            label: label.into(),
        }
    }

    fn command_line(&self, args: Vec<OsString>) -> (OsString, Vec<OsString>) {
        match &self.sudo {
            Some(sudo) => {
                let mut full = Vec::with_capacity(args.len() + 1);
                full.push(self.docker.clone().into_os_string());
                full.extend(args);
                (sudo.clone().into_os_string(), full)
            }
            None => (self.docker.clone().into_os_string(), args),
        }
    }

    fn list_args(&self) -> Vec<OsString> {
        let label_filter = format!("label={}", self.label);
        [
            "ps",
            "--no-trunc",
            "--filter",
            "status=running",
            "--filter",
            label_filter.as_str(),
            "--format",
            "{{.ID}}\t{{.Names}}",
        ]
        .into_iter()
        .map(OsString::from)
        .collect()
    }

    fn inspect_args(container: &Container) -> Vec<OsString> {
        ["inspect", "--format", "{{json .Config.Labels}}", container.id.as_str()]
            .into_iter()
            .map(OsString::from)
            .collect()
    }

    fn exec_args(container: &Container, options: &ExecOptions, command: &[String]) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["exec".into()];
        if options.interactive {
            args.push("-i".into());
        }
        if options.tty {
            args.push("-t".into());
        }
        if let Some(user) = &options.user {
            args.push("-u".into());
            args.push(user.into());
        }
        if let Some(workdir) = &options.workdir {
            args.push("-w".into());
            args.push(workdir.into());
        }
        for (key, value) in &options.env {
            args.push("-e".into());
            args.push(format!("{key}={value}").into());
        }
        if let Some(env_file) = &options.env_file {
            args.push("--env-file".into());
            args.push(env_file.into());
        }
        args.push((&container.id).into());
        args.extend(command.iter().map(OsString::from));
        args
    }
}

/// Parse `docker ps` output of the form `<id>\t<name>[,<name>...]`, keeping
/// the first name.
fn parse_candidates(output: &str) -> Result<Vec<Container>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let (id, names) = line
                .split_once('\t')
                .ok_or_else(|| Error::UnexpectedOutput(line.to_string()))?;
            let name = names.split(',').next().unwrap_or(names);
            Ok(Container::new(id.trim(), name.trim()))
        })
        .collect()
}

/// Extract and decode the job document stored under `label`.
///
/// A missing label or a label that is not valid JSON yields [`Value::Null`].
fn parse_labels(container: &Container, label: &str, output: &str) -> Result<Value> {
    let labels: Option<BTreeMap<String, String>> = serde_json::from_str(output.trim())?;
    let Some(text) = labels.as_ref().and_then(|labels| labels.get(label)) else {
        debug!("{container} - No {label} label");
        return Ok(Value::Null);
    };
    match serde_json::from_str(text) {
        Ok(document) => Ok(document),
        Err(err) => {
            warn!("{container} - Failed to decode {label} label - {err}");
            Ok(Value::Null)
        }
    }
}

impl Runtime for DockerRuntime {
    fn list_candidates(&self) -> Result<Vec<Container>> {
        let (program, args) = self.command_line(self.list_args());
        let output = capture_output(&program, &args)?;
        let containers = parse_candidates(&output)?;
        debug!("Found {} candidate containers", containers.len());
        Ok(containers)
    }

    fn metadata(&self, container: &Container) -> Result<Value> {
        let (program, args) = self.command_line(Self::inspect_args(container));
        let output = capture_output(&program, &args)?;
        parse_labels(container, &self.label, &output)
    }

    fn exec(
        &self,
        container: &Container,
        options: &ExecOptions,
        command: &[String],
        out: &mut dyn Write,
    ) -> Result<()> {
        let (program, args) = self.command_line(Self::exec_args(container, options, command));
        let stdin = if options.interactive {
            Stdio::inherit()
        } else {
            Stdio::null()
        };
        debug!("{container} - Running {}", command.join(" "));
        let mut child = spawn_process(&program, &args, stdin)?;
        stream_output(&mut child, out)?;
        Ok(())
    }
}
