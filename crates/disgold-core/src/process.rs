// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Bounded execution of external tools.

use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use camino::Utf8Path;
use tracing::{debug, warn};

use crate::error::{HarnessError, InvocationFailure, Result};

/// Interval between exit-status polls.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs `command` to completion and returns its standard output.
///
/// Standard output and standard error are drained on helper threads so a
/// chatty tool cannot fill its pipes and stall. The process is killed if it
/// has not exited after `timeout`. Nothing is retried.
///
/// # Errors
///
/// Returns [`HarnessError::DisassemblyInvocation`] if the executable is
/// missing, the process cannot be spawned, exits unsuccessfully, times out,
/// or writes non-UTF-8 output.
pub(crate) fn run_tool(
    command: Command,
    tool: &str,
    artifact: &Utf8Path,
    timeout: Duration,
) -> Result<String> {
    debug!(?command, "Running disassembler");
    run_bounded(command, timeout).map_err(|reason| {
        if matches!(reason, InvocationFailure::TimedOut(_)) {
            warn!(tool, %artifact, ?timeout, "Disassembler timed out, killed it");
        }
        HarnessError::DisassemblyInvocation {
            tool: tool.to_string(),
            artifact: artifact.to_owned(),
            reason,
        }
    })
}

/// Probes `program --version` to check that a tool can be run at all.
///
/// The probe is bounded by `timeout` like any other invocation.
///
/// # Errors
///
/// Returns [`HarnessError::ToolUnavailable`] with installation instructions
/// if the probe cannot be run, fails, or hangs.
pub fn check_tool_available(program: &str, hint: &str, timeout: Duration) -> Result<()> {
    let mut command = Command::new(program);
    command.arg("--version");

    run_bounded(command, timeout).map(drop).map_err(|failure| {
        let reason = match failure {
            InvocationFailure::NotFound => "not found in PATH".to_string(),
            InvocationFailure::Exit { status, .. } => {
                format!("`{program} --version` exited with {status}")
            }
            InvocationFailure::TimedOut(after) => {
                format!("`{program} --version` timed out after {}s", after.as_secs_f64())
            }
            other => other.to_string(),
        };
        HarnessError::ToolUnavailable {
            tool: program.to_string(),
            reason,
            hint: hint.to_string(),
        }
    })
}

/// Spawns `command`, waits at most `timeout` and returns its standard
/// output. A process that is killed is always reaped.
fn run_bounded(mut command: Command, timeout: Duration) -> std::result::Result<String, InvocationFailure> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                InvocationFailure::NotFound
            } else {
                InvocationFailure::Io(e)
            }
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if start.elapsed() < timeout => thread::sleep(POLL_INTERVAL),
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(InvocationFailure::TimedOut(timeout));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(InvocationFailure::Io(e));
            }
        }
    };

    let stdout = collect(stdout).map_err(InvocationFailure::Io)?;
    let stderr = collect(stderr).map_err(InvocationFailure::Io)?;
    debug!(
        elapsed_ms = start.elapsed().as_millis(),
        stdout_bytes = stdout.len(),
        "Process finished"
    );

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
        return Err(InvocationFailure::Exit {
            status,
            stderr: if stderr.is_empty() {
                "(no output on stderr)".to_string()
            } else {
                stderr
            },
        });
    }

    String::from_utf8(stdout).map_err(|_| InvocationFailure::NonUtf8)
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(handle: JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("output reader thread panicked")))
}
