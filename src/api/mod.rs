//! # API Module
//!
//! HTTP endpoints of the spotdwn web front end. The browser searches for a
//! track, starts downloads or imports, and follows progress live through a
//! Server-Sent Events stream.
//!
//! ## Endpoints
//!
//! - `GET /` - [`index`] minimal HTML page
//! - `GET /health` - [`health`] status and version
//! - `POST /api/search` - [`search`] candidates with a playable reference
//! - `POST /api/download` - [`download`] starts one download session
//! - `POST /api/import` - [`import`] runs an import file in the background
//! - `PUT /api/credentials` - [`update_credentials`] edits the API keys
//! - `GET /api/events` - [`events`] progress of all sessions
//!
//! ## Error Responses
//!
//! Handlers return [`crate::error::Result`]; errors are rendered as
//! `{"error": {"code", "message"}}` with a matching status code
//! (401 for token absence, 404 for no match, 400 for bad input).
//!
//! ## Dependencies
//!
//! - [`axum`] for routing, JSON and SSE
//! - [`tokio_stream`] to adapt the broadcast channel into an SSE stream

mod credentials;
mod download;
mod error_response;
mod events;
mod health;
mod import;
mod index;
mod search;
mod state;

pub use credentials::update_credentials;
pub use download::download;
pub use events::events;
pub use health::health;
pub use import::import;
pub use index::index;
pub use search::search;
pub use state::AppState;
