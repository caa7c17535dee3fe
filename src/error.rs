//! Error taxonomy for resolving and downloading tracks.
//!
//! Every user-visible failure carries enough context (query text, path, exit
//! code or underlying message) to be diagnosed without extra logging.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::FailureReason;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing credentials or a failed client-credentials exchange.
    #[error("Unable to acquire token: {0}")]
    Auth(String),

    /// The search succeeded but returned nothing for the query.
    #[error("No matching tracks found for '{title}' by '{artist}'")]
    NoMatch { title: String, artist: String },

    /// A track was found but carries no playable reference.
    #[error("URL missing for track '{title}' by '{artist}'")]
    MissingReference { title: String, artist: String },

    /// A downloader process could not be started or supervised.
    #[error("Error during download: {0}")]
    Orchestration(String),

    /// A downloader ran and exited nonzero without a recoverable signature.
    #[error("Download failed with code {0}")]
    DownloadFailed(i32),

    #[error("Failed to create or access folder '{}': {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A web request was missing a required field.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unable to read import file '{}': {message}", .path.display())]
    Import { path: PathBuf, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Failure code recorded for a batch item or download outcome.
    pub fn reason(&self) -> FailureReason {
        match self {
            Error::Auth(_) => FailureReason::Auth,
            Error::NoMatch { .. } | Error::MissingReference { .. } => FailureReason::NoMatch,
            Error::DownloadFailed(code) => FailureReason::ExitCode(*code),
            Error::Filesystem { .. } | Error::Io(_) => FailureReason::Filesystem,
            Error::Orchestration(_)
            | Error::InvalidRequest(_)
            | Error::Import { .. }
            | Error::Http(_)
            | Error::Json(_) => FailureReason::Orchestration,
        }
    }

    /// HTTP status used by the web front end.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Auth(_) => 401,
            Error::NoMatch { .. } | Error::MissingReference { .. } => 404,
            Error::Import { .. } | Error::InvalidRequest(_) => 400,
            _ => 500,
        }
    }

    /// Short machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Auth(_) => "auth",
            Error::NoMatch { .. } => "no_match",
            Error::MissingReference { .. } => "missing_reference",
            Error::Orchestration(_) => "orchestration",
            Error::DownloadFailed(_) => "download_failed",
            Error::Filesystem { .. } => "filesystem",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Import { .. } => "import",
            Error::Http(_) => "http",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }
}
