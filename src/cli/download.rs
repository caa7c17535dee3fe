use std::path::PathBuf;

use reqwest::Client;

use crate::{
    config::Config,
    download::Orchestrator,
    error, info, success,
    types::{DownloadJob, DownloadOutcome},
    utils, warning,
};

pub async fn download(
    config: &Config,
    song: String,
    artist: String,
    path: Option<PathBuf>,
    pick: usize,
) {
    let http = Client::new();
    let pick = pick.max(1);
    let limit = (pick as u32).max(config.search_limit).min(50);

    let tracks = super::resolve(&http, config, &song, &artist, limit).await;
    let Some(track) = tracks
        .into_iter()
        .filter(|t| t.playable().is_some())
        .nth(pick - 1)
    else {
        warning!("Song not found.");
        return;
    };

    success!(
        "'{}' by {} on album '{}' found.",
        track.title,
        track.artists(),
        track.album_name
    );

    let root = path.unwrap_or_else(|| config.download_root.clone());
    let destination = match utils::derive_path(&root, &track.artists(), &track.album_name).await {
        Ok(destination) => destination,
        Err(e) => error!("{}", e),
    };

    let Some(job) = DownloadJob::new(track, destination) else {
        error!("URL missing for track.");
    };
    info!("Downloading into '{}'...", job.destination.display());

    let (progress, printer) = super::spawn_printer();
    let outcome = Orchestrator::from_config(config).run(&job, &progress).await;
    drop(progress);
    let _ = printer.await;

    match outcome {
        DownloadOutcome::Success => success!("Download complete!"),
        DownloadOutcome::FallbackUsed { original_reason } => {
            success!("Download complete! (fallback after: {})", original_reason)
        }
        DownloadOutcome::Failed { message, .. } => error!("{}", message),
    }
}
