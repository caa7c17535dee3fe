#![cfg(unix)]

mod common;

use std::path::Path;

use common::*;
use spotdwn::{
    download::Orchestrator,
    types::{DownloadJob, DownloadOutcome, FailureReason, ProgressEvent},
};
use tokio::sync::mpsc;

const TRACK_URL: &str = "https://open.example/track/1";

fn job(destination: &Path) -> DownloadJob {
    DownloadJob::new(
        track("SongA", "ArtistA", "AlbumA", Some(TRACK_URL)),
        destination.to_path_buf(),
    )
    .unwrap()
}

async fn run(orchestrator: &Orchestrator, job: &DownloadJob) -> (DownloadOutcome, Vec<ProgressEvent>) {
    let (tx, rx) = mpsc::channel(1024);
    let outcome = orchestrator.run(job, &tx).await;
    drop(tx);
    (outcome, collect(rx).await)
}

#[tokio::test]
async fn test_primary_success() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let primary = recording_script(dir, "primary", "echo 'Downloading...'\nexit 0");
    let fallback = recording_script(dir, "fallback", "exit 0");
    let orchestrator = Orchestrator::new(downloaders(&primary, &fallback, dir));

    let dest = dir.join("ArtistA").join("AlbumA");
    let (outcome, events) = run(&orchestrator, &job(&dest)).await;

    assert_eq!(outcome, DownloadOutcome::Success);
    assert_eq!(
        recorded_args(dir, "primary").unwrap(),
        vec![TRACK_URL.to_string(), "--output".to_string(), dest.display().to_string()]
    );
    assert_eq!(recorded_args(dir, "fallback"), None);

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], ProgressEvent::stdout("Downloading..."));
    assert!(matches!(events[1], ProgressEvent::DownloadComplete { .. }));
}

#[tokio::test]
async fn test_output_is_relayed_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let primary = recording_script(
        dir,
        "primary",
        "for i in 1 2 3 4 5 6 7 8; do echo \"line $i\"; done\nexit 0",
    );
    let fallback = recording_script(dir, "fallback", "exit 0");
    let orchestrator = Orchestrator::new(downloaders(&primary, &fallback, dir));

    let (outcome, events) = run(&orchestrator, &job(dir)).await;

    assert!(outcome.is_success());
    let expected: Vec<String> = (1..=8).map(|i| format!("line {}", i)).collect();
    assert_eq!(stdout_lines(&events), expected);

    // The terminal event is always last
    assert!(matches!(events.last(), Some(ProgressEvent::DownloadComplete { .. })));
}

#[tokio::test]
async fn test_progress_redraws_are_separate_lines() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let primary = recording_script(
        dir,
        "primary",
        "printf '10%%\\r50%%\\r100%%\\n'\nprintf 'Done\\r\\n'\nexit 0",
    );
    let fallback = recording_script(dir, "fallback", "exit 0");
    let orchestrator = Orchestrator::new(downloaders(&primary, &fallback, dir));

    let (outcome, events) = run(&orchestrator, &job(dir)).await;

    assert_eq!(outcome, DownloadOutcome::Success);
    assert_eq!(stdout_lines(&events), ["10%", "50%", "100%", "Done"]);
}

#[tokio::test]
async fn test_stderr_is_relayed() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let primary = recording_script(dir, "primary", "echo 'warning: slow mirror' >&2\nexit 0");
    let fallback = recording_script(dir, "fallback", "exit 0");
    let orchestrator = Orchestrator::new(downloaders(&primary, &fallback, dir));

    let (_, events) = run(&orchestrator, &job(dir)).await;

    assert!(stdout_lines(&events).contains(&"warning: slow mirror".to_string()));
}

#[tokio::test]
async fn test_fallback_on_provider_error() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let primary = recording_script(
        dir,
        "primary",
        "echo 'AudioProviderError: YT-DLP download error - https://yt.example/v/1'\nexit 1",
    );
    let fallback = recording_script(dir, "fallback", "echo '[fallback] done'\nexit 0");
    let orchestrator = Orchestrator::new(downloaders(&primary, &fallback, &dir.join("venv")));

    let dest = dir.join("ArtistA").join("AlbumA");
    let (outcome, events) = run(&orchestrator, &job(&dest)).await;

    assert!(matches!(
        outcome,
        DownloadOutcome::FallbackUsed { ref original_reason }
            if original_reason.contains("AudioProviderError")
    ));

    // No conversion tool installed, so no --ffmpeg-location
    let dest = dest.display().to_string();
    assert_eq!(
        recorded_args(dir, "fallback").unwrap(),
        vec!["https://yt.example/v/1", "-P", dest.as_str(), "-x", "--audio-format", "mp3"]
    );

    let lines = stdout_lines(&events);
    assert!(lines.contains(&"Using fallback URL: https://yt.example/v/1".to_string()));
    assert!(lines.iter().any(|line| line.starts_with("Warning: ffmpeg not found")));
    assert!(lines.contains(&"[fallback] done".to_string()));
    assert!(matches!(events.last(), Some(ProgressEvent::DownloadComplete { .. })));
}

#[tokio::test]
async fn test_fallback_passes_conversion_tool() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let tools_dir = dir.join("venv");
    let ffmpeg = tools_dir.join("bin").join("ffmpeg");
    std::fs::create_dir_all(ffmpeg.parent().unwrap()).unwrap();
    std::fs::write(&ffmpeg, "").unwrap();
    std::fs::set_permissions(&ffmpeg, std::fs::Permissions::from_mode(0o755)).unwrap();

    let primary = recording_script(
        dir,
        "primary",
        "echo 'AudioProviderError: blocked - https://yt.example/v/2'\nexit 1",
    );
    let fallback = recording_script(dir, "fallback", "exit 0");
    let orchestrator = Orchestrator::new(downloaders(&primary, &fallback, &tools_dir));

    let (outcome, events) = run(&orchestrator, &job(dir)).await;

    assert!(matches!(outcome, DownloadOutcome::FallbackUsed { .. }));
    let args = recorded_args(dir, "fallback").unwrap();
    assert_eq!(&args[6..], ["--ffmpeg-location".to_string(), ffmpeg.display().to_string()]);
    assert!(!stdout_lines(&events).iter().any(|line| line.starts_with("Warning:")));
}

#[tokio::test]
async fn test_signature_triggers_fallback_even_on_zero_exit() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let primary = recording_script(
        dir,
        "primary",
        "echo 'AudioProviderError: partial - https://yt.example/v/3' >&2\nexit 0",
    );
    let fallback = recording_script(dir, "fallback", "exit 0");
    let orchestrator = Orchestrator::new(downloaders(&primary, &fallback, dir));

    let (outcome, _) = run(&orchestrator, &job(dir)).await;

    assert!(matches!(outcome, DownloadOutcome::FallbackUsed { .. }));
    assert_eq!(recorded_args(dir, "fallback").unwrap()[0], "https://yt.example/v/3");
}

#[tokio::test]
async fn test_nonzero_exit_without_signature() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let primary = recording_script(dir, "primary", "echo 'Something else broke'\nexit 2");
    let fallback = recording_script(dir, "fallback", "exit 0");
    let orchestrator = Orchestrator::new(downloaders(&primary, &fallback, dir));

    let (outcome, events) = run(&orchestrator, &job(dir)).await;

    assert!(matches!(
        outcome,
        DownloadOutcome::Failed {
            reason: FailureReason::ExitCode(2),
            ..
        }
    ));
    assert_eq!(recorded_args(dir, "fallback"), None);
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::stdout("Download failed with code 2."))
    );
}

#[tokio::test]
async fn test_fallback_failure_reports_its_exit_code() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let primary = recording_script(
        dir,
        "primary",
        "echo 'AudioProviderError: gone - https://yt.example/v/4'\nexit 1",
    );
    let fallback = recording_script(dir, "fallback", "exit 3");
    let orchestrator = Orchestrator::new(downloaders(&primary, &fallback, dir));

    let (outcome, events) = run(&orchestrator, &job(dir)).await;

    assert!(matches!(
        outcome,
        DownloadOutcome::Failed {
            reason: FailureReason::ExitCode(3),
            ..
        }
    ));
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::stdout("Download failed with code 3."))
    );
}

#[tokio::test]
async fn test_killed_process_reports_negative_code() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let primary = recording_script(dir, "primary", "kill -9 $$");
    let fallback = recording_script(dir, "fallback", "exit 0");
    let orchestrator = Orchestrator::new(downloaders(&primary, &fallback, dir));

    let (outcome, _) = run(&orchestrator, &job(dir)).await;

    assert!(matches!(
        outcome,
        DownloadOutcome::Failed {
            reason: FailureReason::ExitCode(-1),
            ..
        }
    ));
}

#[tokio::test]
async fn test_spawn_failure_is_an_orchestration_error() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let fallback = recording_script(dir, "fallback", "exit 0");
    let mut tools = downloaders(&fallback, &fallback, dir);
    tools.primary = dir.join("does-not-exist").display().to_string();
    tools.primary_prefix.clear();
    let orchestrator = Orchestrator::new(tools);

    let (outcome, events) = run(&orchestrator, &job(dir)).await;

    assert!(matches!(
        outcome,
        DownloadOutcome::Failed {
            reason: FailureReason::Orchestration,
            ..
        }
    ));
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        ProgressEvent::DownloadError { message } if message.starts_with("Error during download:")
    ));
}

#[tokio::test]
async fn test_dropped_receiver_does_not_stop_download() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let primary = recording_script(dir, "primary", "echo one\necho two\nexit 0");
    let fallback = recording_script(dir, "fallback", "exit 0");
    let orchestrator = Orchestrator::new(downloaders(&primary, &fallback, dir));

    let (tx, rx) = mpsc::channel(1);
    drop(rx);
    let outcome = orchestrator.run(&job(dir), &tx).await;

    assert_eq!(outcome, DownloadOutcome::Success);
}
