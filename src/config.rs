//! Configuration management for the track downloader.
//!
//! Settings are loaded from environment variables and a `.env` file in the local
//! data directory, then frozen into an explicit [`Config`] that is handed to every
//! operation. Nothing reads the environment after startup.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, path::PathBuf};

pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_PRIMARY_BIN: &str = "spotdl";
pub const DEFAULT_FALLBACK_BIN: &str = "yt-dlp";
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the `spotdwn` data directory if it doesn't exist. A missing `.env`
/// file is fine since every setting has a default.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotdwn/.env`
/// - macOS: `~/Library/Application Support/spotdwn/.env`
/// - Windows: `%LOCALAPPDATA%/spotdwn/.env`
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or the `.env`
/// file exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

/// Platform-specific data directory of the application.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotdwn");
    path
}

/// Runtime configuration, built once per process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Client-credentials token endpoint.
    pub token_url: String,
    /// Base URL of the Web API, without trailing slash.
    pub api_url: String,
    /// Bind address of the web front end.
    pub server_addr: String,
    /// Root folder downloads are placed under.
    pub download_root: PathBuf,
    /// Primary downloader executable, invoked with `<url> --output <dir>`.
    pub primary_bin: String,
    /// Arguments placed before the primary's own (e.g. `-u -m spotdl` for a python launcher).
    pub primary_args: Vec<String>,
    /// Fallback downloader executable, invoked with `<url> -P <dir> -x --audio-format mp3`.
    pub fallback_bin: String,
    /// Arguments placed before the fallback's own.
    pub fallback_args: Vec<String>,
    /// Conventional home of the audio conversion tool (`bin/ffmpeg` or `Scripts/ffmpeg.exe`).
    pub tools_dir: PathBuf,
    /// Key-value file holding the client id and secret.
    pub credentials_path: PathBuf,
    /// Number of candidates requested for interactive searches.
    pub search_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        let data = data_dir();
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            server_addr: DEFAULT_SERVER_ADDRESS.to_string(),
            download_root: default_download_root(),
            primary_bin: DEFAULT_PRIMARY_BIN.to_string(),
            primary_args: Vec::new(),
            fallback_bin: DEFAULT_FALLBACK_BIN.to_string(),
            fallback_args: Vec::new(),
            tools_dir: data.join("venv"),
            credentials_path: data.join("credentials"),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl Config {
    /// Builds the configuration from the current environment.
    ///
    /// Call after [`load_env`] so values from the `.env` file are visible.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            token_url: var_or("SPOTDWN_TOKEN_URL", defaults.token_url),
            api_url: var_or("SPOTDWN_API_URL", defaults.api_url)
                .trim_end_matches('/')
                .to_string(),
            server_addr: var_or("SPOTDWN_SERVER_ADDRESS", defaults.server_addr),
            download_root: path_or("SPOTDWN_DOWNLOAD_PATH", defaults.download_root),
            primary_bin: var_or("SPOTDWN_PRIMARY_BIN", defaults.primary_bin),
            primary_args: args_or("SPOTDWN_PRIMARY_ARGS", defaults.primary_args),
            fallback_bin: var_or("SPOTDWN_FALLBACK_BIN", defaults.fallback_bin),
            fallback_args: args_or("SPOTDWN_FALLBACK_ARGS", defaults.fallback_args),
            tools_dir: path_or("SPOTDWN_TOOLS_DIR", defaults.tools_dir),
            credentials_path: path_or("SPOTDWN_CREDENTIALS", defaults.credentials_path),
            search_limit: env::var("SPOTDWN_SEARCH_LIMIT")
                .ok()
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(defaults.search_limit)
                .clamp(1, 50),
        }
    }

    pub fn search_url(&self) -> String {
        format!("{}/search", self.api_url)
    }
}

fn default_download_root() -> PathBuf {
    let mut path = dirs::audio_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    path.push("spotdwn");
    path
}

fn var_or(key: &str, default: String) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

fn path_or(key: &str, default: PathBuf) -> PathBuf {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or(default)
}

fn args_or(key: &str, default: Vec<String>) -> Vec<String> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.split_whitespace().map(str::to_string).collect(),
        _ => default,
    }
}
