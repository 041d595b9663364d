use std::sync::Arc;

use axum::extract::State;
use axum::response::Redirect;
use axum::routing::post;
use axum::{Form, Router};
use kamus_core::error::KamusError;
use kamus_core::prompt::Direction;
use serde::Deserialize;

use crate::error::AppError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/credential", post(set_credential))
        .route("/direction", post(set_direction))
}

#[derive(Deserialize)]
pub struct CredentialForm {
    #[serde(default)]
    api_key: String,
}

#[derive(Deserialize)]
pub struct DirectionForm {
    direction: String,
}

async fn set_credential(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CredentialForm>,
) -> Redirect {
    let mut chat = state.chat.lock().await;
    chat.set_api_key(&form.api_key);
    tracing::debug!("api key updated (set: {})", chat.has_api_key());
    Redirect::to("/")
}

async fn set_direction(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DirectionForm>,
) -> Result<Redirect, AppError> {
    let direction: Direction = form.direction.parse().map_err(KamusError::InvalidInput)?;
    state.chat.lock().await.set_direction(direction)?;
    tracing::info!("translation direction: {direction}");
    Ok(Redirect::to("/"))
}
