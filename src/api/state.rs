use std::sync::Arc;

use reqwest::Client;
use tokio::sync::{broadcast, mpsc};

use crate::{
    config::Config,
    credentials::CredentialStore,
    download::Orchestrator,
    types::{DownloadJob, DownloadOutcome, ProgressEvent, SessionEvent},
    utils, warning,
};

const SESSION_BUFFER: usize = 256;
const EVENT_BUFFER: usize = 1024;

/// Shared state of the web front end.
///
/// Cloned per request; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub credentials: Arc<CredentialStore>,
    pub http: Client,
    pub orchestrator: Arc<Orchestrator>,
    pub events: broadcast::Sender<SessionEvent>,
}

impl AppState {
    pub fn new(config: Arc<Config>, credentials: Arc<CredentialStore>, http: Client) -> Self {
        let orchestrator = Arc::new(Orchestrator::from_config(&config));
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            config,
            credentials,
            http,
            orchestrator,
            events,
        }
    }

    /// Opens a progress channel whose events are fanned out to all subscribers.
    ///
    /// The forwarding task ends once every sender for the session is dropped.
    pub fn open_session(&self) -> (String, mpsc::Sender<ProgressEvent>) {
        let id = utils::generate_session_id();
        let (tx, mut rx) = mpsc::channel::<ProgressEvent>(SESSION_BUFFER);

        let events = self.events.clone();
        let session = id.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                // no subscribers is fine, the browser may connect later
                let _ = events.send(SessionEvent {
                    session: session.clone(),
                    event,
                });
            }
        });

        (id, tx)
    }

    /// Publishes a single event outside of a download session.
    pub fn publish(&self, session: &str, event: ProgressEvent) {
        let _ = self.events.send(SessionEvent {
            session: session.to_string(),
            event,
        });
    }

    /// Starts a download session in the background and returns its id.
    pub fn start_download(&self, job: DownloadJob) -> String {
        let (id, progress) = self.open_session();
        let orchestrator = Arc::clone(&self.orchestrator);
        let session = id.clone();

        tokio::spawn(async move {
            let outcome = orchestrator.run(&job, &progress).await;
            if let DownloadOutcome::Failed { message, .. } = outcome {
                warning!("Session {} failed: {}", session, message);
            }
        });

        id
    }
}
