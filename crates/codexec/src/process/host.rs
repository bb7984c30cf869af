//! Process spawning and I/O on the host
//!
//! Every child is started in its own process group so that a timeout can
//! kill the whole tree, not just the direct child.

use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::process::{Invocation, ProcessError, ProcessOutput, ProcessRunner};

const READ_CHUNK: usize = 8192;

/// Runs invocations as real child processes of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProcessRunner;

impl HostProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for HostProcessRunner {
    #[instrument(skip(self, invocation), fields(program = invocation.program()))]
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, ProcessError> {
        let (program, args) = invocation
            .command()
            .split_first()
            .ok_or(ProcessError::EmptyCommand)?;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true);
        if let Some(dir) = invocation.dir() {
            command.current_dir(dir);
        }

        debug!(args = ?invocation.command(), "spawning process");

        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;
        // The child leads its own group, so its pid is also the group id.
        // Captured now because `id()` returns None once the child is reaped.
        let pgid = child.id();

        let limit = invocation.output_limit();
        let mut stdout_task = tokio::spawn(read_capped(child.stdout.take(), limit));
        let mut stderr_task = tokio::spawn(read_capped(child.stderr.take(), limit));

        let waited = tokio::time::timeout(invocation.time_limit(), async {
            let status = child.wait().await?;
            // Background descendants would otherwise keep the pipes open
            kill_orphaned_group(pgid);
            let stdout = join_output(&mut stdout_task).await?;
            let stderr = join_output(&mut stderr_task).await?;
            Ok::<_, ProcessError>((status, stdout, stderr))
        })
        .await;

        match waited {
            Ok(Ok((status, stdout, stderr))) => {
                let output = ProcessOutput {
                    stdout,
                    stderr,
                    exit_code: status.code(),
                    signal: status.signal(),
                    wall_time: started.elapsed(),
                };
                debug!(
                    exit_code = ?output.exit_code,
                    signal = ?output.signal,
                    wall_time = ?output.wall_time,
                    stdout_len = output.stdout.len(),
                    stderr_len = output.stderr.len(),
                    "process exited"
                );
                Ok(output)
            }
            Ok(Err(err)) => {
                terminate(&mut child, pgid, &stdout_task, &stderr_task).await;
                Err(err)
            }
            Err(_) => {
                terminate(&mut child, pgid, &stdout_task, &stderr_task).await;
                warn!(
                    limit = ?invocation.time_limit(),
                    "process exceeded wall clock limit, killed process group"
                );
                Err(ProcessError::Timeout(invocation.time_limit()))
            }
        }
    }
}

/// Kill the whole group, reap the child and stop collecting output
async fn terminate(
    child: &mut tokio::process::Child,
    pgid: Option<u32>,
    stdout_task: &JoinHandle<std::io::Result<Vec<u8>>>,
    stderr_task: &JoinHandle<std::io::Result<Vec<u8>>>,
) {
    kill_process_group(pgid);
    if let Err(e) = child.kill().await {
        debug!(error = %e, "child already exited");
    }
    stdout_task.abort();
    stderr_task.abort();
}

/// Kill the entire process group led by `pgid` via `killpg(SIGKILL)`.
///
/// No-op if the group no longer exists or the id cannot be represented as
/// `i32`.
fn kill_process_group(pgid: Option<u32>) {
    if let Some(pgid) = pgid
        && let Ok(pgid) = i32::try_from(pgid)
    {
        let _ = killpg(Pid::from_raw(pgid), Signal::SIGKILL);
    }
}

/// Kill what is left of the group after its leader has been reaped.
///
/// A pid cannot be reused while a process group with that id still has
/// members, so the group is probed first. The remaining window between the
/// probe and the kill only exists when the group is already empty.
fn kill_orphaned_group(pgid: Option<u32>) {
    if group_exists(pgid) {
        kill_process_group(pgid);
    }
}

fn group_exists(pgid: Option<u32>) -> bool {
    pgid.and_then(|pgid| i32::try_from(pgid).ok())
        .is_some_and(|pgid| killpg(Pid::from_raw(pgid), None).is_ok())
}

async fn join_output(
    task: &mut JoinHandle<std::io::Result<Vec<u8>>>,
) -> Result<Vec<u8>, ProcessError> {
    match task.await {
        Ok(result) => Ok(result?),
        Err(e) => Err(ProcessError::Io(std::io::Error::other(e))),
    }
}

/// Read a stream to EOF, keeping at most `cap` bytes.
///
/// The stream is drained past the cap so the writer never blocks on a full
/// pipe.
async fn read_capped<R>(reader: Option<R>, cap: usize) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(Vec::new());
    };

    let mut kept = Vec::new();
    let mut buf = [0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        let room = cap.saturating_sub(kept.len());
        if let Some(chunk) = buf.get(..n.min(room)) {
            kept.extend_from_slice(chunk);
        }
    }
    Ok(kept)
}
