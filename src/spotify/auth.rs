use reqwest::Client;

use crate::{
    config::Config,
    credentials::Credentials,
    error::{Error, Result},
    types::TokenResponse,
    warning,
};

/// Exchanges client credentials for a short-lived bearer token.
///
/// Performs a single client-credentials grant against the configured token
/// endpoint. Every failure (incomplete credentials, network error, non-success
/// status, malformed body, missing `access_token`) is reported as a warning and
/// collapsed to `None`, so callers only need to check for token presence.
///
/// Tokens are never cached; each call performs a fresh exchange and the caller
/// decides when a new token is needed.
///
/// # Arguments
///
/// * `http` - Shared HTTP client
/// * `config` - Runtime configuration holding the token endpoint
/// * `creds` - Snapshot of the stored client id and secret
///
/// # Example
///
/// ```
/// let Some(token) = acquire_token(&http, &config, &creds).await else {
///     warning!("Unable to acquire token. Check your API keys.");
///     return;
/// };
/// ```
pub async fn acquire_token(http: &Client, config: &Config, creds: &Credentials) -> Option<String> {
    match request_token(http, config, creds).await {
        Ok(token) => Some(token),
        Err(e) => {
            warning!("{}", e);
            None
        }
    }
}

/// Performs the credential exchange and reports why it failed.
///
/// # Errors
///
/// Always [`Error::Auth`], with the status code or parse failure in the message.
pub async fn request_token(http: &Client, config: &Config, creds: &Credentials) -> Result<String> {
    if !creds.is_complete() {
        return Err(Error::Auth("client id or secret is not set".to_string()));
    }

    let res = http
        .post(&config.token_url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
        ])
        .send()
        .await
        .map_err(|e| Error::Auth(format!("token request failed: {}", e)))?;

    let status = res.status();
    if !status.is_success() {
        return Err(Error::Auth(format!(
            "token endpoint responded with {}",
            status
        )));
    }

    let body: TokenResponse = res
        .json()
        .await
        .map_err(|e| Error::Auth(format!("malformed token response: {}", e)))?;

    if body.access_token.is_empty() {
        return Err(Error::Auth("token response has an empty access_token".to_string()));
    }

    Ok(body.access_token)
}
