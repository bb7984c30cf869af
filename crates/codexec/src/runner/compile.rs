//! Compilation step for code execution
//!
//! Handles compiling source code using language-specific compilers.

use tracing::{debug, instrument};

use crate::artifact::{Artifact, binary_path};
use crate::config::Toolchain;
use crate::process::{Invocation, ProcessOutput, ProcessRunner};
use crate::runner::{ExecError, Stage};
use crate::types::Limits;

/// Compile `source` if the toolchain has a compile step.
///
/// Returns the executable for compiled languages and `None` for interpreted
/// ones. On failure the (possibly half-written) executable is removed before
/// returning.
#[instrument(skip_all, fields(source = %source.path().display()))]
pub async fn compile(
    process: &dyn ProcessRunner,
    toolchain: &Toolchain,
    source: &Artifact,
    limits: &Limits,
) -> Result<Option<Artifact>, ExecError> {
    let output_path = binary_path(source.path());
    let Some(command) = toolchain.compile_command(source.path(), &output_path) else {
        return Ok(None);
    };
    let binary = Artifact::reserve(output_path);

    let mut invocation = Invocation::new(command)
        .timeout(limits.compile_duration())
        .max_output(limits.max_output_bytes());
    if let Some(dir) = source.path().parent() {
        invocation = invocation.working_dir(dir);
    }

    let output = process
        .run(&invocation)
        .await
        .map_err(|e| ExecError::from_process(e, Stage::Compile))?;

    debug!(
        success = output.is_success(),
        exit_code = ?output.exit_code,
        wall_time = ?output.wall_time,
        "compilation complete"
    );

    if !output.is_success() {
        return Err(ExecError::Compilation {
            diagnostics: diagnostics(&output),
        });
    }

    if !binary.exists() {
        return Err(ExecError::System(format!(
            "compiler exited successfully but produced no executable at {}",
            binary.path().display()
        )));
    }

    Ok(Some(binary))
}

/// The compiler's stderr, falling back to stdout and then to the exit status
/// when a compiler reports nothing on stderr
fn diagnostics(output: &ProcessOutput) -> String {
    if !output.stderr.is_empty() {
        return output.stderr_text();
    }
    if !output.stdout.is_empty() {
        return output.stdout_text();
    }
    match (output.exit_code, output.signal) {
        (Some(code), _) => format!("compiler exited with status {code}"),
        (None, Some(signal)) => format!("compiler killed by signal {signal}"),
        (None, None) => "compiler failed".to_owned(),
    }
}
