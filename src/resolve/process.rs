//! Bounded subprocess execution.
//!
//! Both subprocess calls made during resolution (the active-project
//! indicator and the git metadata query) go through [`run_with_timeout`].
//! On deadline the child is killed and reaped, so no zombie outlives the
//! call.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error as ThisError;

/// Interval between exit-status polls.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured output of a finished subprocess.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit status.
    pub status: ExitStatus,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

/// Why a subprocess produced no usable output.
///
/// These never cross the resolution boundary: callers log them and degrade
/// to "no value".
#[derive(Debug, ThisError)]
pub enum CommandFailure {
    /// The program could not be started (missing binary, permissions).
    #[error("failed to spawn '{program}': {cause}")]
    Spawn {
        /// Program name.
        program: String,
        /// The underlying cause.
        cause: String,
    },

    /// The program ran past its deadline and was killed.
    #[error("'{program}' did not finish within {timeout:?}")]
    TimedOut {
        /// Program name.
        program: String,
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// Waiting on the program failed.
    #[error("failed waiting on '{program}': {cause}")]
    Wait {
        /// Program name.
        program: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Runs `command` to completion, killing it if it outlives `timeout`.
///
/// Stdin is closed. Stdout and stderr are drained on helper threads so a
/// chatty child cannot block on a full pipe. If the child exits but a
/// descendant keeps its pipes open past the deadline, the readers are
/// abandoned and the call reports [`CommandFailure::TimedOut`].
///
/// # Errors
///
/// Returns a [`CommandFailure`] if the program cannot be spawned, cannot be
/// waited on, or does not finish in time.
pub fn run_with_timeout(
    mut command: Command,
    timeout: Duration,
) -> Result<CommandOutput, CommandFailure> {
    let program = command.get_program().to_string_lossy().into_owned();
    let deadline = Instant::now() + timeout;

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| CommandFailure::Spawn {
            program: program.clone(),
            cause: e.to_string(),
        })?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    terminate(&mut child);
                    tracing::debug!(program = %program, ?timeout, "Subprocess timed out");
                    return Err(CommandFailure::TimedOut { program, timeout });
                }
                thread::sleep(POLL_INTERVAL);
            },
            Err(e) => {
                terminate(&mut child);
                return Err(CommandFailure::Wait {
                    program,
                    cause: e.to_string(),
                });
            },
        }
    };

    let stdout = collect(stdout, deadline).ok_or_else(|| CommandFailure::TimedOut {
        program: program.clone(),
        timeout,
    })?;
    let stderr = collect(stderr, deadline).ok_or(CommandFailure::TimedOut { program, timeout })?;

    Ok(CommandOutput {
        status,
        stdout,
        stderr,
    })
}

/// Reads a pipe to EOF on a detached thread.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        // A read error leaves whatever was read so far.
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

/// Waits for a drained pipe until `deadline`. `None` means the reader did
/// not finish in time.
fn collect(reader: Option<Receiver<Vec<u8>>>, deadline: Instant) -> Option<String> {
    let Some(reader) = reader else {
        return Some(String::new());
    };
    // Always allow one poll interval so output written just before exit is
    // picked up even when the child finished right at the deadline.
    let wait = deadline
        .saturating_duration_since(Instant::now())
        .max(POLL_INTERVAL);
    reader
        .recv_timeout(wait)
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// Kills and reaps a child.
fn terminate(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
