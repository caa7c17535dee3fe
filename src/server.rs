use axum::{
    Extension, Router,
    routing::{get, post, put},
};
use std::{net::SocketAddr, str::FromStr};

use crate::{Res, api, api::AppState, info};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/health", get(api::health))
        .route("/api/search", post(api::search))
        .route("/api/download", post(api::download))
        .route("/api/import", post(api::import))
        .route("/api/credentials", put(api::update_credentials))
        .route("/api/events", get(api::events))
        .layer(Extension(state))
}

pub async fn start_web_server(state: AppState) -> Res<()> {
    let addr = SocketAddr::from_str(&state.config.server_addr)
        .map_err(|e| format!("Failed to parse server address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web front end listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
