use axum::{Extension, Json};
use serde::Deserialize;

use crate::{
    api::AppState,
    error::{Error, Result},
    spotify,
    types::TrackRecord,
};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub song_name: String,
    pub artist_name: String,
}

/// Looks up candidates for a song and returns those that can be downloaded.
pub async fn search(
    Extension(state): Extension<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Vec<TrackRecord>>> {
    let creds = state.credentials.refresh().await?;

    let token = spotify::auth::acquire_token(&state.http, &state.config, &creds)
        .await
        .ok_or_else(|| Error::Auth("Please check API credentials.".to_string()))?;

    let tracks = spotify::search::search_tracks(
        &state.http,
        &state.config,
        &token,
        &req.song_name,
        &req.artist_name,
        state.config.search_limit,
    )
    .await;

    if tracks.is_empty() {
        return Err(Error::NoMatch {
            title: req.song_name,
            artist: req.artist_name,
        });
    }

    let playable: Vec<TrackRecord> = tracks
        .into_iter()
        .filter(|track| track.playable().is_some())
        .collect();

    if playable.is_empty() {
        return Err(Error::MissingReference {
            title: req.song_name,
            artist: req.artist_name,
        });
    }

    Ok(Json(playable))
}
