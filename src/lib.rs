//! Spotify Track Downloader Library
//!
//! This library resolves free-text song/artist queries to Spotify tracks and
//! drives external downloader tools to fetch the audio into an
//! `artist/album` folder layout. Progress of every download is relayed line by
//! line to the caller, either the terminal or a browser via Server-Sent Events.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the web front end
//! - `batch` - Import-file batch processing
//! - `cli` - Command-line interface implementations
//! - `config` - Environment loading and the explicit runtime configuration
//! - `credentials` - Persistent client id / secret store
//! - `download` - Downloader supervision with primary/fallback switching
//! - `error` - Error taxonomy shared by all operations
//! - `server` - Web server bootstrap and session fan-out
//! - `spotify` - Token exchange and track search
//! - `types` - Data structures and type definitions
//! - `utils` - Sanitizing, path derivation and parsing helpers
//!
//! # Example
//!
//! ```
//! use spotdwn::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> spotdwn::Res<()> {
//!     config::load_env().await?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod batch;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod download;
pub mod error;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for top-level operations.
///
/// Library operations return [`error::Result`]; command and server entry
/// points collapse everything into this boxed error so `main` can report it.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Searching for '{}' by '{}'...", song, artist);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Download complete!");
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only used for fatal setup failures in command entry points; library
/// operations report failures through return values instead.
///
/// # Example
///
/// ```
/// error!("Failed to bind web server: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("Spotify API search failed: {}", status);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
