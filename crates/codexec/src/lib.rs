//! A library for time-bounded execution of untrusted code snippets.
//!
//! codexec takes a language and a piece of source code, compiles it if the
//! language needs it, runs it in a child process under a wall-clock limit and
//! hands back the captured output together with a classification of how the
//! run ended.
//!
//! # Features
//!
//! - **Multi-language** — Python, C and C++ out of the box, driven by a per-language toolchain table.
//! - **Hard timeouts** — Runs and compilations are both bounded; a timeout kills the whole process group.
//! - **Scoped artifacts** — Temporary sources and binaries are removed on every exit path.
//! - **Concurrent** — Requests share nothing but the temp directory, and use unique names there.
//! - **TOML configuration** — Timeouts, toolchain commands and the temp directory, with environment overrides.
//!
//! ```rust,no_run
//! # async fn demo() {
//! use codexec::{ExecutionRequest, Runner};
//!
//! let runner = Runner::with_defaults();
//! let outcome = runner
//!     .execute(&ExecutionRequest::new("python", "print('hello')"))
//!     .await;
//! assert_eq!(outcome.output_text, "hello\n");
//! # }
//! ```

pub use artifact::Artifact;
pub use config::{Config, ConfigError, EXAMPLE_CONFIG, Language, Languages, Toolchain};
pub use process::{HostProcessRunner, Invocation, ProcessError, ProcessOutput, ProcessRunner};
pub use runner::{ExecError, Runner, Stage};
pub use types::{ErrorKind, ExecutionOutcome, ExecutionRequest, Limits};

pub mod artifact;
pub mod config;
pub mod process;
pub mod runner;
pub mod types;
