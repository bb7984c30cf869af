//! Child process execution
//!
//! Compilers, interpreters and compiled programs are all started through the
//! [`ProcessRunner`] capability so the runner can be exercised without real
//! toolchains installed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use crate::process::host::HostProcessRunner;
use crate::types::Limits;

mod host;

/// Errors that occur while running a child process
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("empty command")]
    EmptyCommand,

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("process timed out after {:.1}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Starts a child process and waits for it under a wall-clock limit
#[async_trait]
pub trait ProcessRunner: Send + Sync + std::fmt::Debug {
    /// Run `invocation` to completion.
    ///
    /// Must return [`ProcessError::Timeout`] once the invocation's timeout
    /// elapses, after the process and its descendants have been killed.
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, ProcessError>;
}

/// A single command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    command: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Duration,
    max_output: usize,
}

impl Invocation {
    /// Create an invocation for `command` (program followed by arguments)
    pub fn new(command: Vec<String>) -> Self {
        let limits = Limits::default();
        Self {
            command,
            working_dir: None,
            timeout: limits.run_duration(),
            max_output: limits.max_output_bytes(),
        }
    }

    /// Set the working directory
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the wall clock limit
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of bytes kept from each output stream
    pub fn max_output(mut self, bytes: usize) -> Self {
        self.max_output = bytes;
        self
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// The program name, if the command is not empty
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    pub fn dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn time_limit(&self) -> Duration {
        self.timeout
    }

    pub fn output_limit(&self) -> usize {
        self.max_output
    }
}

/// Captured result of a process that ran to completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,

    /// Exit code if the process exited normally
    pub exit_code: Option<i32>,

    /// Signal number if the process was killed by a signal
    pub signal: Option<i32>,

    /// Wall clock time from spawn to exit
    pub wall_time: Duration,
}

impl ProcessOutput {
    /// Check if the process exited with code 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}
