//! Shared helpers for router tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::Router;
use http_body_util::BodyExt;
use kamus_core::chat::ChatState;
use kamus_core::completion::CompletionClient;
use kamus_core::config::KamusConfig;
use kamus_core::prompt::Direction;
use kamus_core::store::SessionStore;
use tempfile::TempDir;
use tokio::sync::Mutex;

use crate::AppState;

/// App state backed by a session file inside a fresh temp dir.
pub fn test_state(endpoint: Option<String>) -> (TempDir, Arc<AppState>) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = KamusConfig::default_config();
    config.store.path = Some(dir.path().join("sessions.json").to_string_lossy().into_owned());
    if let Some(endpoint) = endpoint {
        config.completion.endpoint = endpoint;
    }
    let store = SessionStore::from_config(&config.store);
    let chat = ChatState::init(store, Direction::AutoDetect).unwrap();
    let state = Arc::new(AppState {
        chat: Mutex::new(chat),
        completion: CompletionClient::from_config(&config.completion),
        config,
    });
    (dir, state)
}

pub fn router_with(state: &Arc<AppState>) -> Router {
    crate::routes::router().with_state(state.clone())
}

pub fn test_router() -> (TempDir, Router) {
    let (dir, state) = test_state(None);
    (dir, router_with(&state))
}

pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_text(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Mock completions endpoint answering every POST with `status` and `body`.
pub async fn spawn_completion(status: StatusCode, body: &'static str) -> String {
    let router = Router::new().route(
        "/api/v1/chat/completions",
        post(move || async move { (status, body) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api/v1/chat/completions")
}
