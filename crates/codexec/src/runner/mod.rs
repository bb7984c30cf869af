//! Code runner for codexec
//!
//! Takes a request through materialize → compile → run. The artifacts of
//! each stage are scoped guards, so cleanup happens on every exit path.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

pub use crate::runner::compile::compile;
pub use crate::runner::execute::execute;
pub use crate::runner::materialize::materialize;

mod compile;
mod execute;
mod materialize;

use crate::config::{Config, Language};
use crate::process::{HostProcessRunner, ProcessError, ProcessRunner};
use crate::types::{ErrorKind, ExecutionOutcome, ExecutionRequest, Limits};

/// Step of the pipeline a process was started for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compile,
    Run,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Compile => f.write_str("compilation"),
            Stage::Run => f.write_str("execution"),
        }
    }
}

/// Errors that end a request before it produces program output
///
/// Each variant corresponds to one [`ErrorKind`]; the display text becomes
/// the outcome's output text.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("no source code provided")]
    EmptyInput,

    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),

    /// Compiler diagnostics, verbatim
    #[error("{diagnostics}")]
    Compilation { diagnostics: String },

    #[error("{stage} timed out after {:.1}s", .limit.as_secs_f64())]
    Timeout { stage: Stage, limit: Duration },

    /// The program's stderr, verbatim
    #[error("{stderr}")]
    Runtime {
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("{0}")]
    System(String),
}

impl ExecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecError::EmptyInput => ErrorKind::EmptyInput,
            ExecError::UnsupportedLanguage(_) => ErrorKind::UnsupportedLanguage,
            ExecError::Compilation { .. } => ErrorKind::CompilationError,
            ExecError::Timeout { .. } => ErrorKind::Timeout,
            ExecError::Runtime { .. } => ErrorKind::RuntimeError,
            ExecError::System(_) => ErrorKind::SystemError,
        }
    }

    /// Classify a failure to run a process during `stage`
    pub(crate) fn from_process(err: ProcessError, stage: Stage) -> Self {
        match err {
            ProcessError::Timeout(limit) => ExecError::Timeout { stage, limit },
            other => ExecError::System(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ExecError {
    fn from(err: std::io::Error) -> Self {
        ExecError::System(format!("I/O error: {err}"))
    }
}

impl From<ExecError> for ExecutionOutcome {
    fn from(err: ExecError) -> Self {
        ExecutionOutcome {
            error_kind: err.kind(),
            output_text: err.to_string(),
        }
    }
}

/// High-level runner for code execution
///
/// Cheap to clone; clones share the process runner and the concurrency cap.
#[derive(Debug, Clone)]
pub struct Runner {
    config: Config,
    process: Arc<dyn ProcessRunner>,
    permits: Option<Arc<Semaphore>>,
}

impl Runner {
    /// Create a new runner that starts real processes on the host
    pub fn new(config: Config) -> Self {
        Self::with_process_runner(config, Arc::new(HostProcessRunner))
    }

    /// Create a new runner with default configuration
    pub fn with_defaults() -> Self {
        Self::new(Config::default())
    }

    /// Create a runner that starts processes through `process`
    pub fn with_process_runner(config: Config, process: Arc<dyn ProcessRunner>) -> Self {
        let permits = config
            .max_concurrent
            .map(|count| Arc::new(Semaphore::new(count)));
        Self {
            config,
            process,
            permits,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a request with the configured limits
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionOutcome {
        self.execute_with_limits(request, None).await
    }

    /// Run a request, layering `limits` over the configured defaults.
    ///
    /// Never fails: every error is folded into the outcome.
    pub async fn execute_with_limits(
        &self,
        request: &ExecutionRequest,
        limits: Option<&Limits>,
    ) -> ExecutionOutcome {
        let outcome = match self.run(request, limits).await {
            Ok(stdout) => ExecutionOutcome::success(stdout),
            Err(err) => ExecutionOutcome::from(err),
        };
        debug!(
            language = %request.language,
            error_kind = %outcome.error_kind,
            output_len = outcome.output_text.len(),
            "request finished"
        );
        outcome
    }

    /// Run a request and return the program's stdout, or the reason it
    /// produced none
    #[instrument(skip(self, request, limits), fields(language = %request.language, len = request.source_code.len()))]
    pub async fn run(
        &self,
        request: &ExecutionRequest,
        limits: Option<&Limits>,
    ) -> Result<String, ExecError> {
        if request.source_code.is_empty() {
            return Err(ExecError::EmptyInput);
        }
        let language: Language = request
            .language
            .parse()
            .map_err(|_| ExecError::UnsupportedLanguage(request.language.clone()))?;
        if let Some(overrides) = limits {
            overrides.validate().map_err(ExecError::System)?;
        }

        let toolchain = self.config.toolchain(language);
        let limits = self.config.effective_limits(limits);

        let _permit = match &self.permits {
            Some(permits) => Some(
                permits
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|_| ExecError::System("runner is shutting down".to_owned()))?,
            ),
            None => None,
        };

        let source = materialize(
            &self.config.temp_dir(),
            toolchain,
            request.source_code.as_bytes(),
        )
        .await?;
        let binary = compile(self.process.as_ref(), toolchain, &source, &limits).await?;
        execute(self.process.as_ref(), toolchain, &source, binary, &limits).await
    }
}
