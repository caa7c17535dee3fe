use reqwest::Client;
use tabled::Table;

use crate::{config::Config, types::TrackTableRow, warning};

pub async fn search(config: &Config, song: String, artist: String, limit: Option<u32>) {
    let http = Client::new();
    let limit = limit.unwrap_or(config.search_limit).clamp(1, 50);

    let tracks = super::resolve(&http, config, &song, &artist, limit).await;
    if tracks.is_empty() {
        warning!("No songs found. Please try a different title or artist.");
        return;
    }

    let rows: Vec<TrackTableRow> = tracks
        .into_iter()
        .filter(|t| t.playable().is_some())
        .enumerate()
        .map(|(i, t)| TrackTableRow {
            index: i + 1,
            artists: t.artists(),
            url: t.playable().unwrap_or_default().to_string(),
            title: t.title,
            album: t.album_name,
        })
        .collect();

    if rows.is_empty() {
        warning!("No valid song URLs found in results.");
        return;
    }

    println!("{}", Table::new(rows));
}
