use std::io::{self, BufRead, Write};

use crate::{
    config::Config,
    credentials::{CredentialStore, Credentials},
    error, success, warning,
};

/// Edits the stored API keys.
///
/// Values not passed as flags are prompted for; an empty answer keeps the
/// current value.
pub async fn keys(config: &Config, client_id: Option<String>, client_secret: Option<String>) {
    let store = match CredentialStore::open(&config.credentials_path).await {
        Ok(store) => store,
        Err(e) => error!("Cannot read API keys. Err: {}", e),
    };
    let current = store.get().await;

    let client_id = client_id.unwrap_or_else(|| prompt("Client ID", &current.client_id));
    let client_secret =
        client_secret.unwrap_or_else(|| prompt("Client Secret", &current.client_secret));

    let creds = Credentials::new(client_id.trim(), client_secret.trim());
    if !creds.is_complete() {
        warning!("Client ID and Client Secret are both required. Nothing changed.");
        return;
    }

    match store.set(creds).await {
        Ok(()) => success!("API keys saved to '{}'.", store.path().display()),
        Err(e) => error!("Failed to save API keys: {}", e),
    }
}

fn prompt(label: &str, current: &str) -> String {
    let hint = if current.is_empty() { "not set" } else { "keep current" };
    print!("{} [{}]: ", label, hint);
    let _ = io::stdout().flush();

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return current.to_string();
    }

    match line.trim() {
        "" => current.to_string(),
        value => value.to_string(),
    }
}
