use std::{path::PathBuf, sync::Arc};

use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{
    api::AppState,
    batch::{BatchRunner, Dispatch},
    error::Result,
    types::{DownloadOutcome, ProgressEvent},
    utils,
};

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub import_path: String,
}

#[derive(Debug, Serialize)]
pub struct ImportStarted {
    pub batch_id: String,
    pub songs: usize,
}

/// Parses an import file and processes it in the background.
///
/// Every resolved song becomes its own download session. Per-song failures and
/// the final summary are published under the batch id.
pub async fn import(
    Extension(state): Extension<AppState>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ImportStarted>> {
    let (root, pairs) = utils::parse_import_file(&PathBuf::from(&req.import_path)).await?;
    let creds = state.credentials.refresh().await?;

    let batch_id = utils::generate_session_id();
    let songs = pairs.len();

    let runner = BatchRunner::new(
        state.http.clone(),
        Arc::clone(&state.config),
        Arc::clone(&state.orchestrator),
        Dispatch::Concurrent,
    );

    let batch = batch_id.clone();
    tokio::spawn(async move {
        let report = runner
            .run(&creds, &root, pairs, |_| state.open_session().1)
            .await;

        for item in &report.items {
            if let Some(DownloadOutcome::Failed { message, .. }) = &item.outcome {
                state.publish(
                    &batch,
                    ProgressEvent::stdout(format!(
                        "{} by {}: {}",
                        item.query_title, item.query_artist, message
                    )),
                );
            }
        }

        let summary = format!(
            "Import finished: {} downloaded, {} via fallback, {} failed.",
            report.succeeded(),
            report.fallbacks(),
            report.failed()
        );
        let event = if report.halted {
            ProgressEvent::DownloadError {
                message: format!("Unable to acquire token. Check your API keys. {}", summary),
            }
        } else {
            ProgressEvent::DownloadComplete { message: summary }
        };
        state.publish(&batch, event);
    });

    Ok(Json(ImportStarted { batch_id, songs }))
}
