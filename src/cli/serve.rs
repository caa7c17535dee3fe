use std::sync::Arc;

use reqwest::Client;

use crate::{
    api::AppState, config::Config, credentials::CredentialStore, error,
    server::start_web_server, warning,
};

pub async fn serve(config: Arc<Config>, open: bool) {
    let credentials = match CredentialStore::open(&config.credentials_path).await {
        Ok(store) => Arc::new(store),
        Err(e) => error!("Cannot read API keys. Err: {}", e),
    };

    let url = format!("http://{}", config.server_addr);
    let state = AppState::new(config, credentials, Client::new());
    let server = tokio::spawn(start_web_server(state));

    if open && webbrowser::open(&url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            url
        )
    }

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Web server stopped: {}", e),
        Err(e) => error!("Web server task failed: {}", e),
    }
}
