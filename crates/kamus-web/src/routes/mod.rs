pub mod api;
pub mod chat;
pub mod sessions;
pub mod settings;

use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, Json};
use axum::routing::get;
use axum::Router;
use kamus_core::completion::Completion;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .merge(chat::routes())
        .merge(sessions::routes())
        .merge(settings::routes())
        .merge(api::routes())
        .fallback(not_found)
}

async fn health(
    State(state): State<Arc<AppState>>,
) -> (axum::http::StatusCode, Json<serde_json::Value>) {
    let chat = state.chat.lock().await;
    let store_path = chat.store().path();
    // A store file that exists but cannot be read means the next save may fail too.
    let store_ok = !store_path.exists() || std::fs::metadata(store_path).is_ok_and(|m| m.is_file());

    let status = if store_ok {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(serde_json::json!({
            "status": if store_ok { "ok" } else { "degraded" },
            "sessions": chat.sessions().len(),
            "store": store_path.display().to_string(),
            "model": state.completion.model(),
            "endpoint": state.config.completion.endpoint,
            "api_key_set": chat.has_api_key(),
        })),
    )
}

async fn not_found() -> (axum::http::StatusCode, Html<String>) {
    let body = r#"<!doctype html>
<html><head><title>404 · Kamus</title>
<style>body{font-family:system-ui;background:#0f0f1a;color:#e0e0e0;display:flex;justify-content:center;align-items:center;height:100vh;margin:0}
.box{text-align:center}
h1{font-size:4rem;color:#6c63ff;margin:0}
p{color:#888;margin:0.5rem 0 1.5rem}
a{color:#6c63ff;text-decoration:none;padding:0.5rem 1rem;border:1px solid #2a2a4a;border-radius:8px}
a:hover{border-color:#6c63ff;background:rgba(108,99,255,0.1)}</style>
</head><body><div class="box"><h1>404</h1><p>Halaman ini tidak ada.</p><a href="/">Kembali ke kamus</a></div></body></html>"#;
    (axum::http::StatusCode::NOT_FOUND, Html(body.to_string()))
}
