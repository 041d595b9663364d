use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::routing::post;
use axum::{Form, Router};
use serde::Deserialize;

use crate::error::AppError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}/select", post(select_session))
        .route("/sessions/{id}/menu", post(toggle_menu))
        .route("/sessions/{id}/rename", post(rename_session))
        .route("/sessions/{id}/delete", post(delete_session))
}

#[derive(Deserialize)]
pub struct RenameForm {
    #[serde(default)]
    title: String,
}

async fn create_session(State(state): State<Arc<AppState>>) -> Result<Redirect, AppError> {
    state.chat.lock().await.new_session()?;
    Ok(Redirect::to("/"))
}

async fn select_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    state.chat.lock().await.select(&id)?;
    Ok(Redirect::to("/"))
}

async fn toggle_menu(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    state.chat.lock().await.toggle_menu(&id)?;
    Ok(Redirect::to("/"))
}

async fn rename_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<RenameForm>,
) -> Result<Redirect, AppError> {
    state.chat.lock().await.rename(&id, &form.title)?;
    Ok(Redirect::to("/"))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    state.chat.lock().await.delete(&id)?;
    Ok(Redirect::to("/"))
}
