use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{
    api::AppState,
    error::{Error, Result},
    types::{DownloadJob, TrackRecord},
    utils,
};

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub track_url: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DownloadStarted {
    pub session_id: String,
    pub destination: String,
}

/// Starts a download session for a selected track.
///
/// With both `artist` and `album` the track goes to `root/artist/album`,
/// otherwise straight into the download root.
pub async fn download(
    Extension(state): Extension<AppState>,
    Json(req): Json<DownloadRequest>,
) -> Result<Json<DownloadStarted>> {
    if req.track_url.trim().is_empty() {
        return Err(Error::InvalidRequest(
            "Download URL can't be found/isn't provided".to_string(),
        ));
    }
    // the downloaders would read a leading dash as one of their options
    if req.track_url.trim_start().starts_with('-') {
        return Err(Error::InvalidRequest(format!(
            "'{}' is not a track URL",
            req.track_url
        )));
    }

    let root = &state.config.download_root;
    let destination = match (req.artist.as_deref(), req.album.as_deref()) {
        (Some(artist), Some(album)) => utils::derive_path(root, artist, album).await?,
        _ => {
            utils::ensure_dir(root).await?;
            root.clone()
        }
    };

    let track = TrackRecord {
        title: req.title.unwrap_or_default(),
        artist_names: req.artist.into_iter().collect(),
        album_name: req.album.unwrap_or_default(),
        playable_reference: Some(req.track_url),
        artwork_reference: None,
    };
    let job = DownloadJob::new(track, destination.clone())
        .ok_or_else(|| Error::InvalidRequest("track URL is blank".to_string()))?;

    let session_id = state.start_download(job);

    Ok(Json(DownloadStarted {
        session_id,
        destination: destination.display().to_string(),
    }))
}
