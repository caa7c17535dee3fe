use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use rand::{Rng, distr::Alphanumeric};
use regex::Regex;

use crate::{
    error::{Error, Result},
    types::ImportFile,
};

const ILLEGAL_PATH_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', '\n', '\r', '\t'];

// Error tag emitted by the primary downloader, followed by the alternate source URL.
static FALLBACK_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"AudioProviderError:.*-[ \t]*(https?://\S+)").expect("valid fallback signature")
});

/// Replaces characters that are illegal in file or folder names with `_` and
/// trims surrounding whitespace.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_PATH_CHARS.contains(&c) { '_' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

fn path_component(name: &str) -> String {
    let safe = sanitize_filename(name);
    match safe.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => safe,
    }
}

/// Builds `root/artist/album` from sanitized names without touching the disk.
pub fn destination_for(root: &Path, artist: &str, album: &str) -> PathBuf {
    root.join(path_component(artist)).join(path_component(album))
}

/// Derives the destination folder of a track and makes sure it exists.
///
/// Missing directories (including `root`) are created; existing ones are left
/// alone, so calling this repeatedly with the same input is fine. Distinct raw
/// names that sanitize to the same value share one folder.
///
/// # Errors
///
/// [`Error::Filesystem`] naming the folder that could not be created.
pub async fn derive_path(root: &Path, artist: &str, album: &str) -> Result<PathBuf> {
    let path = destination_for(root, artist, album);
    ensure_dir(&path).await?;
    Ok(path)
}

pub async fn ensure_dir(path: &Path) -> Result<()> {
    async_fs::create_dir_all(path)
        .await
        .map_err(|source| Error::Filesystem {
            path: path.to_path_buf(),
            source,
        })
}

/// Extracts the alternate source URL from accumulated downloader output.
///
/// Matches `AudioProviderError: <message> - <url>` on a single line.
pub fn extract_fallback_url(output: &str) -> Option<String> {
    FALLBACK_SIGNATURE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// The `AudioProviderError` line that carried the fallback URL, if any.
pub fn fallback_reason(output: &str) -> Option<String> {
    FALLBACK_SIGNATURE
        .find(output)
        .map(|m| m.as_str().trim().to_string())
}

/// Parses the contents of an import file into its root and (song, artist) pairs.
pub fn parse_import_str(content: &str) -> std::result::Result<(PathBuf, Vec<(String, String)>), serde_json::Error> {
    let file: ImportFile = serde_json::from_str(content)?;
    let songs = file
        .songs
        .into_iter()
        .map(|s| (s.song_name, s.artist_name))
        .collect();
    Ok((PathBuf::from(file.download_path), songs))
}

/// Reads and parses an import file.
///
/// # Errors
///
/// [`Error::Import`] when the file cannot be read or is not a valid import
/// document, with the offending path in the message.
pub async fn parse_import_file(path: &Path) -> Result<(PathBuf, Vec<(String, String)>)> {
    let content = async_fs::read_to_string(path)
        .await
        .map_err(|e| Error::Import {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    parse_import_str(&content).map_err(|e| Error::Import {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn generate_session_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}
