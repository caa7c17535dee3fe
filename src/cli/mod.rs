//! # CLI Module
//!
//! Terminal front end of spotdwn. Each command refreshes the stored API keys
//! once, then drives the same resolver, path deriver, orchestrator and batch
//! runner the web front end uses.
//!
//! ## Commands
//!
//! - [`search`] - Lists candidates for a song and artist
//! - [`download`] - Downloads one candidate into `root/artist/album`
//! - [`import`] - Processes an import file item by item
//! - [`keys`] - Edits the stored client id and secret
//! - [`serve`] - Starts the web front end
//!
//! ## Usage Patterns
//!
//! ```bash
//! spotdwn keys                                   # store API keys
//! spotdwn search "Song" "Artist"                 # list candidates
//! spotdwn download "Song" "Artist" --pick 2      # download the 2nd candidate
//! spotdwn import ~/list.json                     # batch download
//! spotdwn serve --open                           # web front end
//! ```
//!
//! Downloader output is printed line by line while it runs.

mod download;
mod import;
mod keys;
mod search;
mod serve;

pub use download::download;
pub use import::import;
pub use keys::keys;
pub use search::search;
pub use serve::serve;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::{
    sync::mpsc::{self, Sender},
    task::JoinHandle,
};

use crate::{
    config::Config,
    credentials::{CredentialStore, Credentials},
    error, spotify, success,
    types::{ProgressEvent, TrackRecord},
    warning,
};

/// Reads the stored API keys, exiting when the store cannot be read.
pub(crate) async fn load_credentials(config: &Config) -> Credentials {
    match CredentialStore::open(&config.credentials_path).await {
        Ok(store) => store.get().await,
        Err(e) => error!("Cannot read API keys. Err: {}", e),
    }
}

/// Acquires a token and searches, exiting when no token can be acquired.
pub(crate) async fn resolve(
    http: &Client,
    config: &Config,
    song: &str,
    artist: &str,
    limit: u32,
) -> Vec<TrackRecord> {
    let creds = load_credentials(config).await;

    let Some(token) = spotify::auth::acquire_token(http, config, &creds).await else {
        error!("Unable to acquire token. Check your API keys (spotdwn keys).");
    };

    let pb = spinner(format!("Searching '{}' by '{}'...", song, artist));
    let tracks = spotify::search::search_tracks(http, config, &token, song, artist, limit).await;
    pb.finish_and_clear();

    tracks
}

pub(crate) fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

/// Spawns a task printing progress events until every sender is dropped.
pub(crate) fn spawn_printer() -> (Sender<ProgressEvent>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<ProgressEvent>(256);
    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ProgressEvent::Stdout { data } => println!("{}", data),
                ProgressEvent::DownloadComplete { message } => success!("{}", message),
                ProgressEvent::DownloadError { message } => warning!("{}", message),
            }
        }
    });
    (tx, handle)
}
