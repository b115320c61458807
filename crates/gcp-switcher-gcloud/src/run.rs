// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::io::{BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::GcloudError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Separate stdout/stderr of a finished invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    /// Best text to show when the command failed: stderr, else stdout.
    pub fn failure_text(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_owned()
        } else {
            stderr.to_owned()
        }
    }
}

fn command_line(args: &[&str]) -> String {
    args.join(" ")
}

fn spawn(binary: &str, args: &[&str], command: &mut Command) -> Result<Child, GcloudError> {
    command.args(args).spawn().map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            GcloudError::MissingBinary {
                binary: binary.to_owned(),
            }
        } else {
            GcloudError::Io {
                command: command_line(args),
                source,
            }
        }
    })
}

/// Polls until the child exits or `timeout` passes; on timeout the child is
/// killed and reaped.
fn wait_with_deadline(
    child: &mut Child,
    args: &[&str],
    timeout: Duration,
) -> Result<ExitStatus, GcloudError> {
    let io_error = |source| GcloudError::Io {
        command: command_line(args),
        source,
    };
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    child.wait().map_err(io_error)?;
                    return Err(GcloudError::Timeout {
                        command: command_line(args),
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => return Err(io_error(source)),
        }
    }
}

fn read_pipe<R: Read + Send + 'static>(pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        let mut reader = BufReader::new(pipe);
        let _ = reader.read_to_string(&mut buf);
        buf
    })
}

/// Runs `binary args...` with piped output and a deadline. A non-zero exit is
/// reported as [`GcloudError::NonZeroExit`] carrying the captured output.
pub fn run_captured(
    binary: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<Captured, GcloudError> {
    tracing::debug!(binary, args = %command_line(args), ?timeout, "running gcloud");
    let mut command = Command::new(binary);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = spawn(binary, args, &mut command)?;

    let missing = |name: &str| GcloudError::Io {
        command: command_line(args),
        source: std::io::Error::other(format!("missing {name} pipe")),
    };
    let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
    let stderr = child.stderr.take().ok_or_else(|| missing("stderr"))?;
    let stdout_reader = read_pipe(stdout);
    let stderr_reader = read_pipe(stderr);

    // Reader threads are left detached on timeout: a grandchild may still
    // hold the pipes open.
    let status = wait_with_deadline(&mut child, args, timeout)?;

    let captured = Captured {
        stdout: stdout_reader.join().unwrap_or_default(),
        stderr: stderr_reader.join().unwrap_or_default(),
    };
    tracing::debug!(args = %command_line(args), code = ?status.code(), "gcloud finished");

    if !status.success() {
        return Err(GcloudError::NonZeroExit {
            command: command_line(args),
            exit_code: status.code().unwrap_or(-1),
            output: captured.failure_text(),
        });
    }
    Ok(captured)
}

/// Runs `binary args...` wired to this process's terminal.
pub fn run_attached(binary: &str, args: &[&str], timeout: Duration) -> Result<(), GcloudError> {
    tracing::info!(binary, args = %command_line(args), ?timeout, "running interactive gcloud");
    let mut command = Command::new(binary);
    command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    let mut child = spawn(binary, args, &mut command)?;
    let status = wait_with_deadline(&mut child, args, timeout)?;
    if !status.success() {
        return Err(GcloudError::NonZeroExit {
            command: command_line(args),
            exit_code: status.code().unwrap_or(-1),
            output: String::new(),
        });
    }
    Ok(())
}
