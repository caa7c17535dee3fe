use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tabled::Tabled;

/// A resolved track, built once from a search response.
///
/// Identity is the playable reference. Search results lacking a reference or
/// an artist list are still surfaced; callers check [`TrackRecord::playable`]
/// before acting on a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub title: String,
    pub artist_names: Vec<String>,
    pub album_name: String,
    pub playable_reference: Option<String>,
    pub artwork_reference: Option<String>,
}

impl TrackRecord {
    /// Artist names joined for display and folder naming.
    pub fn artists(&self) -> String {
        self.artist_names.join(", ")
    }

    /// The playable reference, if present and non-empty.
    pub fn playable(&self) -> Option<&str> {
        self.playable_reference
            .as_deref()
            .filter(|reference| !reference.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadJob {
    pub track: TrackRecord,
    pub destination: PathBuf,
}

impl DownloadJob {
    /// Builds a job only for tracks that can actually be downloaded.
    pub fn new(track: TrackRecord, destination: PathBuf) -> Option<Self> {
        track.playable()?;
        Some(Self { track, destination })
    }

    pub fn reference(&self) -> &str {
        self.track.playable().unwrap_or_default()
    }
}

/// Why a download or a batch item did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "code")]
pub enum FailureReason {
    Auth,
    NoMatch,
    Filesystem,
    Orchestration,
    ExitCode(i32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum DownloadOutcome {
    Success,
    Failed {
        reason: FailureReason,
        message: String,
    },
    FallbackUsed {
        original_reason: String,
    },
}

impl DownloadOutcome {
    pub fn failed(reason: FailureReason, message: impl Into<String>) -> Self {
        DownloadOutcome::Failed {
            reason,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, DownloadOutcome::Failed { .. })
    }
}

/// One event on a download session's progress channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum ProgressEvent {
    Stdout { data: String },
    DownloadComplete { message: String },
    DownloadError { message: String },
}

impl ProgressEvent {
    pub fn stdout(data: impl Into<String>) -> Self {
        ProgressEvent::Stdout { data: data.into() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProgressEvent::Stdout { .. } => "stdout",
            ProgressEvent::DownloadComplete { .. } => "download_complete",
            ProgressEvent::DownloadError { .. } => "download_error",
        }
    }
}

/// A progress event tagged with the session that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    pub session: String,
    #[serde(flatten)]
    pub event: ProgressEvent,
}

#[derive(Debug, Clone)]
pub struct BatchItem {
    pub query_title: String,
    pub query_artist: String,
    pub job: Option<DownloadJob>,
    pub outcome: Option<DownloadOutcome>,
}

impl BatchItem {
    pub fn new(query_title: String, query_artist: String) -> Self {
        Self {
            query_title,
            query_artist,
            job: None,
            outcome: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub root: PathBuf,
    pub items: Vec<BatchItem>,
    pub halted: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, DownloadOutcome::Success))
    }

    pub fn fallbacks(&self) -> usize {
        self.count(|o| matches!(o, DownloadOutcome::FallbackUsed { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DownloadOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&DownloadOutcome) -> bool) -> usize {
        self.items
            .iter()
            .filter(|item| item.outcome.as_ref().is_some_and(&pred))
            .count()
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub index: usize,
    pub title: String,
    pub artists: String,
    pub album: String,
    pub url: String,
}

#[derive(Tabled)]
pub struct BatchTableRow {
    pub song: String,
    pub artist: String,
    pub destination: String,
    pub outcome: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportFile {
    pub download_path: String,
    pub songs: Vec<ImportSong>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSong {
    pub song_name: String,
    pub artist_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

// Search payloads may carry explicit nulls where a key would normally be
// omitted; both read as the field's default so one odd item never fails the
// whole page.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Option<TrackItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}
