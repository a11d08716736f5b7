//! Test doubles.

use std::cell::RefCell;
use std::io::Write;

use cdump_io::error::Error;
use cdump_io::prelude::Result;
use cdump_io::runtime::{Container, ExecOptions, Runtime};
use serde_json::Value;

/// In-memory runtime. `echo` prints its arguments, `fail` prints a line
/// and exits with status 2.
pub struct FakeRuntime {
    containers: Vec<(Container, std::result::Result<Value, String>)>,
    pub calls: RefCell<Vec<(String, Vec<String>, ExecOptions)>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self {
            containers: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn container(mut self, name: &str, document: Value) -> Self {
        let container = Container::new(format!("id-{name}"), name);
        self.containers.push((container, Ok(document)));
        self
    }

    pub fn broken_container(mut self, name: &str) -> Self {
        let container = Container::new(format!("id-{name}"), name);
        self.containers
            .push((container, Err(format!("no such container: {name}"))));
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|(container, command, _)| format!("{container}: {}", command.join(" ")))
            .collect()
    }
}

impl Runtime for FakeRuntime {
    fn list_candidates(&self) -> Result<Vec<Container>> {
        Ok(self.containers.iter().map(|(c, _)| c.clone()).collect())
    }

    fn metadata(&self, container: &Container) -> Result<Value> {
        let (_, document) = self
            .containers
            .iter()
            .find(|(c, _)| c == container)
            .expect("known container");
        document
            .clone()
            .map_err(|stderr| Error::CommandFailed {
                program: "docker".to_string(),
                status: "exit status: 1".to_string(),
                stderr,
            })
    }

    fn exec(
        &self,
        container: &Container,
        options: &ExecOptions,
        command: &[String],
        out: &mut dyn Write,
    ) -> Result<()> {
        self.calls.borrow_mut().push((
            container.name.clone(),
            command.to_vec(),
            options.clone(),
        ));
        match command[0].as_str() {
            "echo" => {
                writeln!(out, "{}", command[1..].join(" "))?;
                Ok(())
            }
            "fail" => {
                writeln!(out, "partial")?;
                Err(Error::NonZeroExit(2))
            }
            other => panic!("unexpected command {other}"),
        }
    }
}
