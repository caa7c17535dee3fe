use std::convert::Infallible;

use axum::{
    Extension,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{
    Stream, StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};

use crate::{api::AppState, warning};

/// Server-sent events carrying the progress of every session.
///
/// The SSE event name is the progress event tag (`stdout`, `download_complete`,
/// `download_error`); the data is the JSON encoded [`crate::types::SessionEvent`].
pub async fn events(
    Extension(state): Extension<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.events.subscribe()).filter_map(|result| match result {
        Ok(session_event) => match serde_json::to_string(&session_event) {
            Ok(json) => Some(Ok(Event::default()
                .event(session_event.event.name())
                .data(json))),
            Err(e) => {
                warning!("Failed to serialize progress event: {}", e);
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => Some(Ok(Event::default()
            .event("error")
            .data(format!(r#"{{"error":"lagged","skipped":{}}}"#, skipped)))),
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
