use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use kamus_core::chat::SessionSummary;
use kamus_core::error::KamusError;
use kamus_core::model::{Message, Session};
use serde::Serialize;

use crate::error::ApiError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/sessions", get(list_sessions))
        .route("/api/v1/sessions/{id}", get(get_session))
}

#[derive(Serialize)]
struct SessionDetail {
    id: String,
    title: String,
    created: Option<String>,
    messages: Vec<Message>,
}

impl From<&Session> for SessionDetail {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            created: session.created.as_ref().map(|c| c.to_string()),
            messages: session.messages.clone(),
        }
    }
}

async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionSummary>> {
    Json(state.chat.lock().await.summaries())
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionDetail>, ApiError> {
    let chat = state.chat.lock().await;
    let session = chat
        .sessions()
        .get(&id)
        .ok_or_else(|| KamusError::NotFound(format!("session {id}")))?;
    Ok(Json(SessionDetail::from(session)))
}
