use reqwest::Client;

use crate::{
    config::Config,
    error::Result,
    types::{SearchResponse, TrackItem, TrackRecord},
    warning,
};

/// Searches the catalogue for tracks matching a title and an artist.
///
/// Builds a fielded query (`track:<title> artist:<artist>`), requests up to
/// `limit` tracks and maps each result into a [`TrackRecord`], keeping the
/// provider's ranking (first = best match).
///
/// An empty vector is returned both when nothing matched and when the request
/// itself failed; the failure is reported as a warning. Token absence must be
/// checked by the caller before calling this function.
///
/// # Arguments
///
/// * `http` - Shared HTTP client
/// * `config` - Runtime configuration holding the API base URL
/// * `token` - Bearer token from [`super::auth::acquire_token`]
/// * `title` / `artist` - Free-text query parts
/// * `limit` - Maximum number of results, at least 1
///
/// # Example
///
/// ```
/// let tracks = search_tracks(&http, &config, &token, "Song", "Artist", 5).await;
/// for track in tracks.iter().filter(|t| t.playable().is_some()) {
///     println!("{} by {}", track.title, track.artists());
/// }
/// ```
pub async fn search_tracks(
    http: &Client,
    config: &Config,
    token: &str,
    title: &str,
    artist: &str,
    limit: u32,
) -> Vec<TrackRecord> {
    match request_tracks(http, config, token, title, artist, limit).await {
        Ok(tracks) => tracks,
        Err(e) => {
            warning!("Spotify API search failed: {}", e);
            Vec::new()
        }
    }
}

async fn request_tracks(
    http: &Client,
    config: &Config,
    token: &str,
    title: &str,
    artist: &str,
    limit: u32,
) -> Result<Vec<TrackRecord>> {
    let limit = limit.max(1).to_string();
    let query = build_query(title, artist);

    let res = http
        .get(config.search_url())
        .bearer_auth(token)
        .query(&[("q", query.as_str()), ("type", "track"), ("limit", limit.as_str())])
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        warning!("Spotify API search failed: {} {}", status, body);
        return Ok(Vec::new());
    }

    let response: SearchResponse = res.json().await?;
    let items = response.tracks.map(|page| page.items).unwrap_or_default();

    Ok(items.into_iter().flatten().filter_map(into_record).collect())
}

pub fn build_query(title: &str, artist: &str) -> String {
    format!("track:{} artist:{}", title, artist)
}

/// Maps one search item; items without a title or album are dropped.
pub fn into_record(item: TrackItem) -> Option<TrackRecord> {
    let title = item.name?;
    let album = item.album?;
    let album_name = album.name?;

    Some(TrackRecord {
        title,
        artist_names: item.artists.into_iter().filter_map(|a| a.name).collect(),
        album_name,
        playable_reference: item.external_urls.spotify,
        artwork_reference: album.images.into_iter().find_map(|image| image.url),
    })
}
