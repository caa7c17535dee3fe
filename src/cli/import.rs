use std::{path::PathBuf, sync::Arc};

use reqwest::Client;
use tabled::Table;

use crate::{
    batch::{BatchRunner, Dispatch},
    config::Config,
    download::Orchestrator,
    error, info, success,
    types::{BatchTableRow, DownloadOutcome},
    utils, warning,
};

pub async fn import(config: Arc<Config>, file: PathBuf, path: Option<PathBuf>) {
    let (file_root, pairs) = match utils::parse_import_file(&file).await {
        Ok(parsed) => parsed,
        Err(e) => error!("{}", e),
    };
    let root = path.unwrap_or(file_root);

    info!(
        "Importing {} songs into '{}'...",
        pairs.len(),
        root.display()
    );

    let creds = super::load_credentials(&config).await;
    let orchestrator = Arc::new(Orchestrator::from_config(&config));
    let runner = BatchRunner::new(Client::new(), config, orchestrator, Dispatch::Sequential);

    let (progress, printer) = super::spawn_printer();
    let report = runner
        .run(&creds, &root, pairs, |_| progress.clone())
        .await;
    drop(progress);
    let _ = printer.await;

    let rows: Vec<BatchTableRow> = report
        .items
        .iter()
        .map(|item| BatchTableRow {
            song: item.query_title.clone(),
            artist: item.query_artist.clone(),
            destination: item
                .job
                .as_ref()
                .map(|job| job.destination.display().to_string())
                .unwrap_or_default(),
            outcome: match &item.outcome {
                Some(DownloadOutcome::Success) => "downloaded".to_string(),
                Some(DownloadOutcome::FallbackUsed { .. }) => "downloaded (fallback)".to_string(),
                Some(DownloadOutcome::Failed { message, .. }) => message.clone(),
                None => "skipped".to_string(),
            },
        })
        .collect();
    println!("{}", Table::new(rows));

    let elapsed = report.finished_at - report.started_at;
    info!(
        "{} downloaded, {} via fallback, {} failed in {}s.",
        report.succeeded(),
        report.fallbacks(),
        report.failed(),
        elapsed.num_seconds()
    );

    if report.halted {
        warning!("Unable to acquire token. Check your API keys.");
    } else {
        success!("Import file completed!");
    }
}
