//! Execution step for code running
//!
//! Runs the compiled executable, or the interpreter on the source file.

use tracing::{debug, instrument};

use crate::artifact::Artifact;
use crate::config::Toolchain;
use crate::process::{Invocation, ProcessRunner};
use crate::runner::{ExecError, Stage};
use crate::types::Limits;

/// Run the program and return its stdout.
///
/// A non-zero exit yields [`ExecError::Runtime`] carrying the program's
/// stderr. The executable, if any, is consumed and removed once the run is
/// over, however it ended.
#[instrument(skip_all, fields(source = %source.path().display(), compiled = binary.is_some()))]
pub async fn execute(
    process: &dyn ProcessRunner,
    toolchain: &Toolchain,
    source: &Artifact,
    binary: Option<Artifact>,
    limits: &Limits,
) -> Result<String, ExecError> {
    let program = binary.as_ref().unwrap_or(source);
    let command = toolchain.run_command(source.path(), program.path());

    let mut invocation = Invocation::new(command)
        .timeout(limits.run_duration())
        .max_output(limits.max_output_bytes());
    if let Some(dir) = source.path().parent() {
        invocation = invocation.working_dir(dir);
    }

    let output = process
        .run(&invocation)
        .await
        .map_err(|e| ExecError::from_process(e, Stage::Run))?;

    debug!(
        exit_code = ?output.exit_code,
        signal = ?output.signal,
        wall_time = ?output.wall_time,
        "execution complete"
    );

    if output.is_success() {
        Ok(output.stdout_text())
    } else {
        Err(ExecError::Runtime {
            stderr: output.stderr_text(),
            exit_code: output.exit_code,
        })
    }
}
