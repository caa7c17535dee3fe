#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use spotdwn::{
    config::Config,
    download::Downloaders,
    types::{ProgressEvent, TrackRecord},
};
use tokio::sync::mpsc::Receiver;

/// Writes a shell script that records its arguments to `<dir>/<name>.args`
/// before running `body`.
///
/// Scripts are run as `sh <script> ...` rather than executed directly, so a
/// freshly written file is never exec'd while another test forks.
pub fn recording_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(format!("{}.sh", name));
    let args = dir.join(format!("{}.args", name));
    std::fs::write(
        &path,
        format!(
            "printf '%s\\n' \"$@\" > '{}'\n{}\n",
            args.display(),
            body
        ),
    )
    .unwrap();
    path
}

/// Arguments a recording script was invoked with, `None` if it never ran.
pub fn recorded_args(dir: &Path, name: &str) -> Option<Vec<String>> {
    std::fs::read_to_string(dir.join(format!("{}.args", name)))
        .ok()
        .map(|content| content.lines().map(str::to_string).collect())
}

pub fn downloaders(primary: &Path, fallback: &Path, tools_dir: &Path) -> Downloaders {
    Downloaders {
        primary: "sh".to_string(),
        primary_prefix: vec![primary.display().to_string()],
        fallback: "sh".to_string(),
        fallback_prefix: vec![fallback.display().to_string()],
        tools_dir: tools_dir.to_path_buf(),
    }
}

/// Configuration pointing the API at a mock server and the downloaders at scripts.
pub fn test_config(api: &str, root: &Path, primary: &Path, fallback: &Path) -> Config {
    Config {
        token_url: format!("{}/api/token", api),
        api_url: api.to_string(),
        server_addr: "127.0.0.1:0".to_string(),
        download_root: root.to_path_buf(),
        primary_bin: "sh".to_string(),
        primary_args: vec![primary.display().to_string()],
        fallback_bin: "sh".to_string(),
        fallback_args: vec![fallback.display().to_string()],
        tools_dir: root.join("venv"),
        credentials_path: root.join("credentials"),
        search_limit: 5,
    }
}

pub fn track(title: &str, artist: &str, album: &str, reference: Option<&str>) -> TrackRecord {
    TrackRecord {
        title: title.to_string(),
        artist_names: vec![artist.to_string()],
        album_name: album.to_string(),
        playable_reference: reference.map(str::to_string),
        artwork_reference: None,
    }
}

/// One search result item in the provider's wire format.
pub fn track_item(title: &str, artist: &str, album: &str, url: &str) -> Value {
    json!({
        "name": title,
        "artists": [{ "name": artist }],
        "album": {
            "name": album,
            "images": [{ "url": format!("https://img.example/{}.jpg", album) }]
        },
        "external_urls": { "spotify": url }
    })
}

pub fn search_body(items: Vec<Value>) -> Value {
    json!({ "tracks": { "items": items } })
}

/// Drains a progress channel once all senders are gone.
pub async fn collect(mut rx: Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

pub fn stdout_lines(events: &[ProgressEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::Stdout { data } => Some(data.clone()),
            _ => None,
        })
        .collect()
}
