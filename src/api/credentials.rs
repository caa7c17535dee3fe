use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    api::AppState,
    credentials::Credentials,
    error::{Error, Result},
};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub client_id: String,
    pub client_secret: String,
}

pub async fn update_credentials(
    Extension(state): Extension<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<Value>> {
    let creds = Credentials::new(req.client_id.trim(), req.client_secret.trim());
    if !creds.is_complete() {
        return Err(Error::InvalidRequest(
            "client_id and client_secret must not be empty".to_string(),
        ));
    }

    state.credentials.set(creds).await?;
    Ok(Json(json!({ "status": "ok" })))
}
