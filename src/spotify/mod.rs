//! # Spotify Integration Module
//!
//! Thin client for the two Web API calls the downloader needs: exchanging the
//! application's client credentials for a bearer token, and searching for a
//! track by title and artist.
//!
//! ## Contracts
//!
//! Both calls report failure by absence rather than by error:
//!
//! - [`auth::acquire_token`] returns `None` when the exchange fails for any reason
//! - [`search::search_tracks`] returns an empty list both for "no match" and for
//!   a failed request
//!
//! so the caller distinguishes "no usable token" from "no match" purely by
//! checking token presence before searching. The underlying reasons are still
//! printed as warnings.
//!
//! ## Usage
//!
//! ```rust
//! let creds = store.refresh().await?;
//! let Some(token) = spotify::auth::acquire_token(&http, &config, &creds).await else {
//!     return Err(Error::Auth("check your API keys".into()));
//! };
//! let tracks = spotify::search::search_tracks(&http, &config, &token, "Song", "Artist", 1).await;
//! ```
//!
//! ## Dependencies
//!
//! - **reqwest** - HTTP client with JSON support
//! - **serde** - Response deserialization with tolerant optional fields

pub mod auth;
pub mod search;
