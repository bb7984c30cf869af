use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Wall-clock limit for a run when none is configured, in seconds
pub const DEFAULT_TIMEOUT: f64 = 5.0;

/// Wall-clock limit for a compilation when none is configured, in seconds
pub const DEFAULT_COMPILE_TIMEOUT: f64 = 10.0;

/// Captured bytes per output stream when none is configured, in kilobytes
pub const DEFAULT_MAX_OUTPUT: u64 = 1024;

/// Execution limits applied to a single request.
///
/// Every field is optional so that a partial set of limits can be layered
/// over the configured defaults with [`Limits::with_overrides`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Wall clock limit for running the program, in seconds
    #[serde(default)]
    pub timeout: Option<f64>,

    /// Wall clock limit for compiling the program, in seconds
    #[serde(default)]
    pub compile_timeout: Option<f64>,

    /// Maximum captured size of each of stdout and stderr, in kilobytes
    #[serde(default)]
    pub max_output: Option<u64>,
}

impl Limits {
    /// Create limits populated with the built-in defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits with every field unset, for use as an override layer
    pub fn unset() -> Self {
        Self {
            timeout: None,
            compile_timeout: None,
            max_output: None,
        }
    }

    /// Set the run timeout in seconds
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Set the compile timeout in seconds
    pub fn with_compile_timeout(mut self, seconds: f64) -> Self {
        self.compile_timeout = Some(seconds);
        self
    }

    /// Set the captured output cap in kilobytes
    pub fn with_max_output(mut self, kb: u64) -> Self {
        self.max_output = Some(kb);
        self
    }

    /// Apply overrides from another `Limits`, preferring values from `overrides`
    pub fn with_overrides(&self, overrides: &Limits) -> Limits {
        Limits {
            timeout: overrides.timeout.or(self.timeout),
            compile_timeout: overrides.compile_timeout.or(self.compile_timeout),
            max_output: overrides.max_output.or(self.max_output),
        }
    }

    /// Check that every set timeout resolves to a non-zero [`Duration`]
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("timeout", self.timeout),
            ("compile_timeout", self.compile_timeout),
        ] {
            if let Some(seconds) = value
                && positive_duration(seconds).is_none()
            {
                return Err(format!(
                    "{name} must be a positive, representable number of seconds, got {seconds}"
                ));
            }
        }
        if self.max_output == Some(0) {
            return Err("max_output must be greater than zero".to_owned());
        }
        Ok(())
    }

    /// Resolved run timeout
    pub fn run_duration(&self) -> Duration {
        seconds_or(self.timeout, DEFAULT_TIMEOUT)
    }

    /// Resolved compile timeout
    pub fn compile_duration(&self) -> Duration {
        seconds_or(self.compile_timeout, DEFAULT_COMPILE_TIMEOUT)
    }

    /// Resolved output cap in bytes
    pub fn max_output_bytes(&self) -> usize {
        let kb = self.max_output.unwrap_or(DEFAULT_MAX_OUTPUT);
        usize::try_from(kb.saturating_mul(1024)).unwrap_or(usize::MAX)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            compile_timeout: Some(DEFAULT_COMPILE_TIMEOUT),
            max_output: Some(DEFAULT_MAX_OUTPUT),
        }
    }
}

/// `seconds` as a non-zero duration, or None if it is negative, not finite,
/// too large for `Duration` or rounds down to zero
fn positive_duration(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds)
        .ok()
        .filter(|duration| !duration.is_zero())
}

fn seconds_or(value: Option<f64>, fallback: f64) -> Duration {
    value
        .and_then(positive_duration)
        .unwrap_or_else(|| Duration::from_secs_f64(fallback))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_language() -> String {
    "python".to_owned()
}

/// A request to run one snippet of code.
///
/// Deserializes from `{ "language": ..., "sourceCode": ... }`. A missing
/// language means `python`; a missing or null source is treated as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub source_code: String,
}

impl ExecutionRequest {
    pub fn new(language: impl Into<String>, source_code: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            source_code: source_code.into(),
        }
    }
}

/// Classification of an execution outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The program ran and exited successfully
    None,
    UnsupportedLanguage,
    CompilationError,
    Timeout,
    /// The program ran but exited unsuccessfully
    RuntimeError,
    /// Host or environment fault, such as a missing toolchain
    SystemError,
    EmptyInput,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::None => "None",
            ErrorKind::UnsupportedLanguage => "UnsupportedLanguage",
            ErrorKind::CompilationError => "CompilationError",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::RuntimeError => "RuntimeError",
            ErrorKind::SystemError => "SystemError",
            ErrorKind::EmptyInput => "EmptyInput",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller gets back for every request, whatever happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    /// Program stdout on success, otherwise the diagnostic text
    pub output_text: String,

    pub error_kind: ErrorKind,
}

impl ExecutionOutcome {
    /// Outcome of a program that exited successfully
    pub fn success(output_text: impl Into<String>) -> Self {
        Self {
            output_text: output_text.into(),
            error_kind: ErrorKind::None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error_kind == ErrorKind::None
    }

    /// Render the outcome as a single human-readable reply string.
    ///
    /// Compilation and system failures are prefixed with a banner, an empty
    /// request gets a fixed notice and a silent successful run reports that
    /// it executed.
    pub fn response_text(&self) -> String {
        match self.error_kind {
            ErrorKind::EmptyInput => "No code provided.".to_owned(),
            ErrorKind::CompilationError => format!("COMPILATION ERROR:\n{}", self.output_text),
            ErrorKind::SystemError => format!("SYSTEM ERROR: {}", self.output_text),
            ErrorKind::None if self.output_text.is_empty() => "Executed successfully.".to_owned(),
            _ => self.output_text.clone(),
        }
    }
}
