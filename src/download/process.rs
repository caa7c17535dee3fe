use std::process::Stdio;

use tokio::{
    io::AsyncReadExt,
    process::Command,
    sync::mpsc::Sender,
};

use crate::{
    error::{Error, Result},
    types::ProgressEvent,
};

const READ_CHUNK: usize = 4096;

/// What a finished downloader process left behind.
#[derive(Debug, Clone)]
pub struct ProcessReport {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Every line the process printed, stdout and stderr interleaved as read.
    pub output: String,
}

/// Splits a byte stream into lines ending at `\n`, `\r` or `\r\n`.
///
/// Progress bars redraw themselves with a bare `\r`, so every redraw becomes
/// its own line. Bytes are kept until a line is complete, which keeps
/// multi-byte characters split across reads intact.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
    after_cr: bool,
}

impl LineSplitter {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &b in bytes {
            match b {
                b'\n' if self.after_cr => self.after_cr = false,
                b'\n' | b'\r' => {
                    lines.push(String::from_utf8_lossy(&self.pending).into_owned());
                    self.pending.clear();
                    self.after_cr = b == b'\r';
                }
                _ => {
                    self.pending.push(b);
                    self.after_cr = false;
                }
            }
        }
        lines
    }

    /// The unterminated tail, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(line)
    }
}

/// Runs an external program and relays its output line by line.
///
/// Each line is sent to `progress` before more output is read, then appended
/// to the scan buffer returned in the report. A dropped receiver does not stop
/// supervision, the process still runs to completion.
///
/// Stdout and stderr are separate pipes read concurrently. Order is exact
/// within each stream, but a line on one stream may be relayed before a line
/// the process wrote earlier on the other.
///
/// # Errors
///
/// [`Error::Orchestration`] when the program cannot be spawned or its output
/// pipes fail. The child is killed when the returned future is dropped.
pub async fn run_streaming(
    program: &str,
    args: &[String],
    progress: &Sender<ProgressEvent>,
) -> Result<ProcessReport> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::Orchestration(format!("failed to start '{}': {}", program, e)))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Orchestration(format!("'{}' has no stdout pipe", program)))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| Error::Orchestration(format!("'{}' has no stderr pipe", program)))?;

    let mut out_buf = [0u8; READ_CHUNK];
    let mut err_buf = [0u8; READ_CHUNK];
    let mut out_lines = LineSplitter::default();
    let mut err_lines = LineSplitter::default();
    let (mut out_open, mut err_open) = (true, true);
    let mut output = String::new();

    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_buf), if out_open => match read {
                Ok(0) => {
                    out_open = false;
                    if let Some(tail) = out_lines.finish() {
                        relay(tail, &mut output, progress).await;
                    }
                }
                Ok(n) => {
                    for line in out_lines.push(&out_buf[..n]) {
                        relay(line, &mut output, progress).await;
                    }
                }
                Err(e) => return Err(pipe_error(program, e)),
            },
            read = stderr.read(&mut err_buf), if err_open => match read {
                Ok(0) => {
                    err_open = false;
                    if let Some(tail) = err_lines.finish() {
                        relay(tail, &mut output, progress).await;
                    }
                }
                Ok(n) => {
                    for line in err_lines.push(&err_buf[..n]) {
                        relay(line, &mut output, progress).await;
                    }
                }
                Err(e) => return Err(pipe_error(program, e)),
            },
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|e| Error::Orchestration(format!("failed to wait for '{}': {}", program, e)))?;

    Ok(ProcessReport {
        exit_code: status.code(),
        output,
    })
}

async fn relay(line: String, output: &mut String, progress: &Sender<ProgressEvent>) {
    output.push_str(&line);
    output.push('\n');

    let _ = progress.send(ProgressEvent::stdout(line)).await;
}

fn pipe_error(program: &str, e: std::io::Error) -> Error {
    Error::Orchestration(format!("lost output of '{}': {}", program, e))
}
