//! Batch processing of (song, artist) pairs from an import file.
//!
//! Items are processed strictly in submission order. A token is acquired for
//! every item; losing the token halts the batch and marks every remaining item
//! as failed with [`FailureReason::Auth`]. Any other per-item failure (no match,
//! missing reference, folder error) is recorded on that item only and the batch
//! moves on.

use std::{path::Path, sync::Arc};

use chrono::Utc;
use reqwest::Client;
use tokio::{sync::mpsc::Sender, task::JoinHandle};

use crate::{
    config::Config,
    credentials::Credentials,
    download::Orchestrator,
    error::{Error, Result},
    info, spotify,
    types::{BatchItem, BatchReport, DownloadJob, DownloadOutcome, FailureReason, ProgressEvent},
    utils, warning,
};

/// How resolved jobs are handed to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Each download finishes before the next item is resolved.
    Sequential,
    /// Each download runs as its own task; outcomes are collected at the end.
    Concurrent,
}

pub struct BatchRunner {
    http: Client,
    config: Arc<Config>,
    orchestrator: Arc<Orchestrator>,
    dispatch: Dispatch,
}

impl BatchRunner {
    pub fn new(
        http: Client,
        config: Arc<Config>,
        orchestrator: Arc<Orchestrator>,
        dispatch: Dispatch,
    ) -> Self {
        Self {
            http,
            config,
            orchestrator,
            dispatch,
        }
    }

    /// Resolves and downloads every pair below `root`.
    ///
    /// `open_session` is called once per resolved job and returns the progress
    /// channel that job's download reports to.
    pub async fn run<F>(
        &self,
        creds: &Credentials,
        root: &Path,
        pairs: Vec<(String, String)>,
        open_session: F,
    ) -> BatchReport
    where
        F: Fn(&DownloadJob) -> Sender<ProgressEvent>,
    {
        let started_at = Utc::now();
        let mut items: Vec<BatchItem> = pairs
            .into_iter()
            .map(|(title, artist)| BatchItem::new(title, artist))
            .collect();
        let mut pending: Vec<(usize, JoinHandle<DownloadOutcome>)> = Vec::new();
        let mut halted = false;

        for index in 0..items.len() {
            let Some(token) =
                spotify::auth::acquire_token(&self.http, &self.config, creds).await
            else {
                warning!("Unable to acquire token. Check your API keys.");
                for item in &mut items[index..] {
                    item.outcome = Some(DownloadOutcome::failed(
                        FailureReason::Auth,
                        "Unable to acquire token. Check your API keys.",
                    ));
                }
                halted = true;
                break;
            };

            let item = &mut items[index];
            let job = match self
                .prepare(&token, root, &item.query_title, &item.query_artist)
                .await
            {
                Ok(job) => job,
                Err(e) => {
                    warning!("{}", e);
                    item.outcome = Some(DownloadOutcome::failed(e.reason(), e.to_string()));
                    continue;
                }
            };

            item.job = Some(job.clone());
            let progress = open_session(&job);

            match self.dispatch {
                Dispatch::Sequential => {
                    item.outcome = Some(self.orchestrator.run(&job, &progress).await);
                }
                Dispatch::Concurrent => {
                    let orchestrator = Arc::clone(&self.orchestrator);
                    let handle =
                        tokio::spawn(async move { orchestrator.run(&job, &progress).await });
                    pending.push((index, handle));
                }
            }
        }

        for (index, handle) in pending {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => DownloadOutcome::failed(
                    FailureReason::Orchestration,
                    format!("Download task join error: {}", e),
                ),
            };
            items[index].outcome = Some(outcome);
        }

        BatchReport {
            root: root.to_path_buf(),
            items,
            halted,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Resolves one pair to a job with an existing destination folder.
    pub async fn prepare(&self, token: &str, root: &Path, title: &str, artist: &str) -> Result<DownloadJob> {
        info!("Searching '{}' by '{}'...", title, artist);

        let tracks =
            spotify::search::search_tracks(&self.http, &self.config, token, title, artist, 1).await;
        let track = tracks.into_iter().next().ok_or_else(|| Error::NoMatch {
            title: title.to_string(),
            artist: artist.to_string(),
        })?;

        if track.playable().is_none() {
            let artist = track.artists();
            return Err(Error::MissingReference {
                title: track.title,
                artist,
            });
        }

        info!(
            "'{}' by {} on album '{}' found.",
            track.title,
            track.artists(),
            track.album_name
        );

        let destination = utils::derive_path(root, &track.artists(), &track.album_name).await?;
        DownloadJob::new(track, destination).ok_or_else(|| Error::MissingReference {
            title: title.to_string(),
            artist: artist.to_string(),
        })
    }
}
