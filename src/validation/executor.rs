use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use super::workspace::Workspace;

/// How long output pipes may stay open once the shell is gone. A process that
/// left the group (`setsid`, a daemon) can hold them open indefinitely.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// How a dry-run process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Exited {
        code: i32,
        stdout: String,
        stderr: String,
    },
    Signalled {
        signal: Option<i32>,
        stderr: String,
    },
    TimedOut {
        elapsed: Duration,
        stderr: String,
    },
    SpawnFailed {
        reason: String,
    },
    WaitFailed {
        reason: String,
    },
}

/// Runs `command` through `shell` in the current directory.
pub fn execute(command: &str, timeout: Duration, shell: &str) -> ExecutionOutcome {
    execute_in(command, timeout, shell, None)
}

/// Writes `command` to a script in a private workspace and runs it with
/// `shell`, stdin closed, until it exits or `timeout` elapses. On timeout the
/// whole process group is killed and reaped before returning.
pub fn execute_in(
    command: &str,
    timeout: Duration,
    shell: &str,
    working_dir: Option<&Path>,
) -> ExecutionOutcome {
    let workspace = match Workspace::create(command) {
        Ok(workspace) => workspace,
        Err(err) => {
            return ExecutionOutcome::SpawnFailed {
                reason: format!("{err:#}"),
            };
        }
    };

    let mut process = Command::new(shell);
    process
        .arg(workspace.script_path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = working_dir {
        process.current_dir(dir);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        process.process_group(0);
    }

    let started = Instant::now();
    let mut child = match process.spawn() {
        Ok(child) => child,
        Err(err) => {
            return ExecutionOutcome::SpawnFailed {
                reason: format!("failed to spawn {shell}: {err}"),
            };
        }
    };
    debug!(pid = child.id(), workspace = %workspace.path().display(), "dry run started");

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    match child.wait_timeout(timeout) {
        Ok(Some(status)) => {
            let deadline = Instant::now() + DRAIN_GRACE;
            from_status(status, collect(stdout, deadline), collect(stderr, deadline))
        }
        Ok(None) => {
            terminate(&mut child);
            let elapsed = started.elapsed();
            let deadline = Instant::now() + DRAIN_GRACE;
            let _ = collect(stdout, deadline);
            ExecutionOutcome::TimedOut {
                elapsed,
                stderr: collect(stderr, deadline),
            }
        }
        Err(err) => {
            terminate(&mut child);
            ExecutionOutcome::WaitFailed {
                reason: format!("failed while waiting for dry run: {err}"),
            }
        }
    }
}

fn from_status(status: ExitStatus, stdout: String, stderr: String) -> ExecutionOutcome {
    match status.code() {
        Some(code) => ExecutionOutcome::Exited {
            code,
            stdout,
            stderr,
        },
        None => ExecutionOutcome::Signalled {
            signal: exit_signal(status),
            stderr,
        },
    }
}

#[cfg(unix)]
fn exit_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: ExitStatus) -> Option<i32> {
    None
}

/// Output of one pipe, filled by a reader thread.
struct Drain {
    buffer: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

fn drain<R>(pipe: Option<R>) -> Option<Drain>
where
    R: Read + Send + 'static,
{
    let mut pipe = pipe?;
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let (finished, done) = mpsc::channel();
    let sink = Arc::clone(&buffer);
    thread::spawn(move || {
        let mut chunk = [0u8; 8192];
        loop {
            match pipe.read(&mut chunk) {
                Ok(0) => break,
                Ok(read) => {
                    if let Ok(mut buffer) = sink.lock() {
                        buffer.extend_from_slice(&chunk[..read]);
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => break,
            }
        }
        let _ = finished.send(());
    });
    Some(Drain { buffer, done })
}

/// Waits for the pipe to close until `deadline`, then returns whatever was
/// read so far.
fn collect(drain: Option<Drain>, deadline: Instant) -> String {
    let Some(drain) = drain else {
        return String::new();
    };
    let wait = deadline.saturating_duration_since(Instant::now());
    if let Err(RecvTimeoutError::Timeout) = drain.done.recv_timeout(wait) {
        warn!("dry-run output pipe is still held open, keeping what was read");
    }
    let bytes = drain
        .buffer
        .lock()
        .map(|buffer| buffer.clone())
        .unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Kills the child's process group, then the child itself, and reaps it.
/// Failures are logged, never returned.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    kill_process_group(child.id());

    if let Err(err) = child.kill() {
        warn!(pid = child.id(), error = %err, "failed to kill dry-run process");
    }
    if let Err(err) = child.wait() {
        warn!(pid = child.id(), error = %err, "failed to reap dry-run process");
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        warn!(pid, "process id out of range, cannot kill its group");
        return;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(err) => warn!(pid, error = %err, "failed to kill dry-run process group"),
    }
}
