mod common;

use std::{path::Path, sync::Arc, time::Duration};

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use common::*;
use reqwest::Client;
use serde_json::{Value, json};
use spotdwn::{
    api::AppState,
    credentials::{CredentialStore, Credentials},
    server::router,
    types::ProgressEvent,
};
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn state_for(api: &str, root: &Path, primary_body: &str) -> AppState {
    let scripts = root.join("scripts");
    std::fs::create_dir_all(&scripts).unwrap();
    let primary = recording_script(&scripts, "primary", primary_body);
    let fallback = recording_script(&scripts, "fallback", "exit 0");

    let config = test_config(api, &root.join("music"), &primary, &fallback);
    let credentials = CredentialStore::open(root.join("credentials")).await.unwrap();
    AppState::new(Arc::new(config), Arc::new(credentials), Client::new())
}

async fn send(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_health() {
    let tmp = tempfile::tempdir().unwrap();
    let state = state_for("http://127.0.0.1:9", tmp.path(), "exit 0").await;

    let (status, body) = send(&state, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["name"], "spotdwn");
}

#[tokio::test]
async fn test_search_without_credentials_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let state = state_for(&server.uri(), tmp.path(), "exit 0").await;

    let (status, body) = send(
        &state,
        "POST",
        "/api/search",
        Some(json!({"song_name": "SongA", "artist_name": "ArtistA"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "auth");
}

#[tokio::test]
async fn test_search_returns_playable_candidates() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![
            track_item("SongA", "ArtistA", "AlbumA", "https://open.example/track/1"),
            json!({ "name": "SongA (Demo)", "album": { "name": "Demos" } }),
        ])))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let state = state_for(&server.uri(), tmp.path(), "exit 0").await;
    state
        .credentials
        .set(Credentials::new("id", "secret"))
        .await
        .unwrap();

    let (status, body) = send(
        &state,
        "POST",
        "/api/search",
        Some(json!({"song_name": "SongA", "artist_name": "ArtistA"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let tracks = body.as_array().unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0]["title"], "SongA");
    assert_eq!(tracks[0]["playable_reference"], "https://open.example/track/1");
}

#[tokio::test]
async fn test_search_without_match_is_not_found() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![])))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("credentials"), "CLIENT_ID=id\nCLIENT_SECRET=secret\n").unwrap();
    let state = state_for(&server.uri(), tmp.path(), "exit 0").await;

    let (status, body) = send(
        &state,
        "POST",
        "/api/search",
        Some(json!({"song_name": "BadQuery", "artist_name": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "no_match");
}

#[tokio::test]
async fn test_search_picks_up_external_credential_edits() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![
            track_item("SongA", "ArtistA", "AlbumA", "https://open.example/track/1"),
        ])))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let state = state_for(&server.uri(), tmp.path(), "exit 0").await;
    let request = json!({"song_name": "SongA", "artist_name": "ArtistA"});

    let (status, _) = send(&state, "POST", "/api/search", Some(request.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Edited outside the server while it runs
    std::fs::write(tmp.path().join("credentials"), "CLIENT_ID=id\nCLIENT_SECRET=secret\n").unwrap();

    let (status, _) = send(&state, "POST", "/api/search", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_credentials() {
    let tmp = tempfile::tempdir().unwrap();
    let state = state_for("http://127.0.0.1:9", tmp.path(), "exit 0").await;

    let (status, body) = send(
        &state,
        "PUT",
        "/api/credentials",
        Some(json!({"client_id": "abc", "client_secret": "def"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let stored = std::fs::read_to_string(tmp.path().join("credentials")).unwrap();
    assert!(stored.contains("CLIENT_ID=abc"));
    assert!(stored.contains("CLIENT_SECRET=def"));
    assert_eq!(state.credentials.get().await, Credentials::new("abc", "def"));

    let (status, body) = send(
        &state,
        "PUT",
        "/api/credentials",
        Some(json!({"client_id": "abc", "client_secret": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_request");
    assert_eq!(state.credentials.get().await, Credentials::new("abc", "def"));
}

#[tokio::test]
async fn test_import_with_unreadable_file_is_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let state = state_for("http://127.0.0.1:9", tmp.path(), "exit 0").await;
    let missing = tmp.path().join("missing.json");

    let (status, body) = send(
        &state,
        "POST",
        "/api/import",
        Some(json!({"import_path": missing.display().to_string()})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "import");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("missing.json")
    );
}

#[tokio::test]
async fn test_download_requires_track_url() {
    let tmp = tempfile::tempdir().unwrap();
    let state = state_for("http://127.0.0.1:9", tmp.path(), "exit 0").await;

    let (status, body) = send(&state, "POST", "/api/download", Some(json!({"track_url": " "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_request");
}

#[tokio::test]
async fn test_download_rejects_option_like_reference() {
    let tmp = tempfile::tempdir().unwrap();
    let state = state_for("http://127.0.0.1:9", tmp.path(), "exit 0").await;
    let mut events = state.events.subscribe();

    let (status, body) = send(
        &state,
        "POST",
        "/api/download",
        Some(json!({"track_url": "--exec=touch pwned", "artist": "ArtistA", "album": "AlbumA"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_request");

    // Rejected before any folder or session exists
    assert!(!tmp.path().join("music").exists());
    assert!(events.try_recv().is_err());
}

#[cfg(unix)]
#[tokio::test]
async fn test_download_streams_session_events() {
    let tmp = tempfile::tempdir().unwrap();
    let state = state_for("http://127.0.0.1:9", tmp.path(), "echo 'Downloading...'\nexit 0").await;
    let mut events = state.events.subscribe();

    let (status, body) = send(
        &state,
        "POST",
        "/api/download",
        Some(json!({
            "track_url": "https://open.example/track/1",
            "title": "SongA",
            "artist": "AC/DC",
            "album": "AlbumA"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let session = body["session_id"].as_str().unwrap().to_string();
    let dest = tmp.path().join("music").join("AC_DC").join("AlbumA");
    assert_eq!(body["destination"], dest.display().to_string());
    assert!(dest.is_dir());

    let mut received = Vec::new();
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let event = events.recv().await.unwrap();
            assert_eq!(event.session, session);
            let done = matches!(event.event, ProgressEvent::DownloadComplete { .. });
            received.push(event.event);
            if done {
                break;
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(received[0], ProgressEvent::stdout("Downloading..."));
}

#[cfg(unix)]
#[tokio::test]
async fn test_import_publishes_summary() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![
            track_item("SongA", "ArtistA", "AlbumA", "https://open.example/track/1"),
        ])))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("credentials"), "CLIENT_ID=id\nCLIENT_SECRET=secret\n").unwrap();
    let state = state_for(&server.uri(), tmp.path(), "exit 0").await;

    let root = tmp.path().join("imported");
    let list = tmp.path().join("list.json");
    std::fs::write(
        &list,
        json!({
            "download_path": root.display().to_string(),
            "songs": [{"song_name": "SongA", "artist_name": "ArtistA"}]
        })
        .to_string(),
    )
    .unwrap();

    let mut events = state.events.subscribe();
    let (status, body) = send(
        &state,
        "POST",
        "/api/import",
        Some(json!({"import_path": list.display().to_string()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["songs"], 1);
    let batch = body["batch_id"].as_str().unwrap().to_string();

    let summary = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let event = events.recv().await.unwrap();
            if event.session == batch {
                return event.event;
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(
        summary,
        ProgressEvent::DownloadComplete {
            message: "Import finished: 1 downloaded, 0 via fallback, 0 failed.".to_string()
        }
    );
    assert!(root.join("ArtistA").join("AlbumA").is_dir());
}
