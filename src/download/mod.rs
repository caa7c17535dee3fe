//! # Download Orchestration
//!
//! Supervises the external downloader tools for one [`DownloadJob`] at a time
//! and relays their output to a per-session progress channel.
//!
//! ## State Machine
//!
//! ```text
//! Idle -> PrimaryRunning -+-> Terminal(Success | Failed)
//!                         |
//!                         +-> FallbackDetecting -> FallbackRunning -> Terminal
//! ```
//!
//! - The primary downloader is started with `<reference> --output <dir>`.
//! - When it exits, the accumulated output is scanned for the recoverable
//!   signature `AudioProviderError: ... - <url>`. If present, the fallback
//!   downloader is started against `<url>` whatever the primary exit code was.
//! - Without the signature, exit code 0 is a success and anything else a
//!   failure carrying the exit code.
//! - A process that cannot be started or supervised ends the session with a
//!   `download_error` event, distinct from a download that reported failure.
//!
//! At most one child process is alive per session; the fallback only starts
//! after the primary has been reaped.

mod process;
mod tools;

use std::path::{Path, PathBuf};

use tokio::sync::mpsc::Sender;

pub use process::{LineSplitter, ProcessReport, run_streaming};
pub use tools::{conversion_tool_path, locate_conversion_tool};

use crate::{
    config::Config,
    error::Error,
    types::{DownloadJob, DownloadOutcome, FailureReason, ProgressEvent},
    utils,
};

/// External executables used by the orchestrator.
///
/// The `*_prefix` arguments go between the program and its contract
/// arguments, for tools started through an interpreter.
#[derive(Debug, Clone)]
pub struct Downloaders {
    pub primary: String,
    pub primary_prefix: Vec<String>,
    pub fallback: String,
    pub fallback_prefix: Vec<String>,
    pub tools_dir: PathBuf,
}

impl Downloaders {
    pub fn from_config(config: &Config) -> Self {
        Self {
            primary: config.primary_bin.clone(),
            primary_prefix: config.primary_args.clone(),
            fallback: config.fallback_bin.clone(),
            fallback_prefix: config.fallback_args.clone(),
            tools_dir: config.tools_dir.clone(),
        }
    }

    pub fn primary_args(reference: &str, destination: &Path) -> Vec<String> {
        vec![
            reference.to_string(),
            "--output".to_string(),
            destination.display().to_string(),
        ]
    }

    pub fn fallback_args(url: &str, destination: &Path, ffmpeg: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            url.to_string(),
            "-P".to_string(),
            destination.display().to_string(),
            "-x".to_string(),
            "--audio-format".to_string(),
            "mp3".to_string(),
        ];
        if let Some(ffmpeg) = ffmpeg {
            args.push("--ffmpeg-location".to_string());
            args.push(ffmpeg.display().to_string());
        }
        args
    }
}

#[derive(Debug)]
enum State {
    Idle,
    PrimaryRunning,
    FallbackDetecting { url: String, original_reason: String },
    FallbackRunning { args: Vec<String>, original_reason: String },
    Terminal(DownloadOutcome),
}

pub struct Orchestrator {
    tools: Downloaders,
}

impl Orchestrator {
    pub fn new(tools: Downloaders) -> Self {
        Self { tools }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Downloaders::from_config(config))
    }

    pub fn tools(&self) -> &Downloaders {
        &self.tools
    }

    /// Runs one download session to its terminal outcome.
    ///
    /// Every output line, the fallback activation and the terminal outcome are
    /// reported on `progress`. The destination folder must already exist.
    pub async fn run(&self, job: &DownloadJob, progress: &Sender<ProgressEvent>) -> DownloadOutcome {
        let mut state = State::Idle;

        loop {
            state = match state {
                State::Idle => State::PrimaryRunning,
                State::PrimaryRunning => {
                    let mut args = self.tools.primary_prefix.clone();
                    args.extend(Downloaders::primary_args(job.reference(), &job.destination));
                    match run_streaming(&self.tools.primary, &args, progress).await {
                        Ok(report) => after_primary(report),
                        Err(e) => State::Terminal(orchestration_failure(e)),
                    }
                }
                State::FallbackDetecting {
                    url,
                    original_reason,
                } => {
                    emit(progress, ProgressEvent::stdout(format!("Using fallback URL: {}", url))).await;

                    let ffmpeg = locate_conversion_tool(&self.tools.tools_dir);
                    if ffmpeg.is_none() {
                        emit(
                            progress,
                            ProgressEvent::stdout(format!(
                                "Warning: ffmpeg not found at '{}', continuing without --ffmpeg-location",
                                conversion_tool_path(&self.tools.tools_dir).display()
                            )),
                        )
                        .await;
                    }

                    let mut args = self.tools.fallback_prefix.clone();
                    args.extend(Downloaders::fallback_args(
                        &url,
                        &job.destination,
                        ffmpeg.as_deref(),
                    ));
                    State::FallbackRunning {
                        args,
                        original_reason,
                    }
                }
                State::FallbackRunning {
                    args,
                    original_reason,
                } => match run_streaming(&self.tools.fallback, &args, progress).await {
                    Ok(report) => State::Terminal(match report.exit_code {
                        Some(0) => DownloadOutcome::FallbackUsed { original_reason },
                        code => exit_failure(code),
                    }),
                    Err(e) => State::Terminal(orchestration_failure(e)),
                },
                State::Terminal(outcome) => {
                    report_outcome(&outcome, progress).await;
                    return outcome;
                }
            };
        }
    }
}

fn after_primary(report: ProcessReport) -> State {
    if let Some(url) = utils::extract_fallback_url(&report.output) {
        let original_reason = utils::fallback_reason(&report.output).unwrap_or_default();
        return State::FallbackDetecting {
            url,
            original_reason,
        };
    }

    match report.exit_code {
        Some(0) => State::Terminal(DownloadOutcome::Success),
        code => State::Terminal(exit_failure(code)),
    }
}

fn exit_failure(code: Option<i32>) -> DownloadOutcome {
    match code {
        Some(code) => DownloadOutcome::failed(
            FailureReason::ExitCode(code),
            Error::DownloadFailed(code).to_string(),
        ),
        None => DownloadOutcome::failed(
            FailureReason::ExitCode(-1),
            "Download failed: process terminated by signal",
        ),
    }
}

fn orchestration_failure(e: Error) -> DownloadOutcome {
    DownloadOutcome::failed(FailureReason::Orchestration, e.to_string())
}

async fn report_outcome(outcome: &DownloadOutcome, progress: &Sender<ProgressEvent>) {
    let event = match outcome {
        DownloadOutcome::Success => ProgressEvent::DownloadComplete {
            message: "Download completed successfully!".to_string(),
        },
        DownloadOutcome::FallbackUsed { .. } => ProgressEvent::DownloadComplete {
            message: "Download completed successfully using the fallback source!".to_string(),
        },
        DownloadOutcome::Failed {
            reason: FailureReason::ExitCode(code),
            ..
        } if *code >= 0 => ProgressEvent::stdout(format!("Download failed with code {}.", code)),
        DownloadOutcome::Failed {
            reason: FailureReason::ExitCode(_),
            message,
        } => ProgressEvent::stdout(message.clone()),
        DownloadOutcome::Failed { message, .. } => ProgressEvent::DownloadError {
            message: message.clone(),
        },
    };
    emit(progress, event).await;
}

async fn emit(progress: &Sender<ProgressEvent>, event: ProgressEvent) {
    let _ = progress.send(event).await;
}
