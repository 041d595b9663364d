use std::sync::Arc;

use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use kamus_core::chat::{ChatState, SendOutcome, SessionSummary, MISSING_CREDENTIAL_ERROR};
use kamus_core::completion::Completion;
use kamus_core::model::Message;
use kamus_core::prompt::Direction;
use serde::Deserialize;

use crate::error::AppError;
use crate::markdown;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/chat", post(send_message))
}

// -- Templates --

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    sessions: Vec<SessionSummary>,
    directions: Vec<DirectionOption>,
    api_key: String,
    model: String,
    active_title: String,
    messages: Vec<MessageView>,
    error: Option<String>,
}

struct DirectionOption {
    slug: &'static str,
    label: &'static str,
    selected: bool,
}

struct MessageView {
    role: String,
    /// Rendered Markdown, already escaped.
    content_html: String,
    timestamp: Option<String>,
}

impl From<&Message> for MessageView {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role.to_string(),
            content_html: markdown::render(&msg.content),
            timestamp: msg.timestamp.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct ChatInput {
    #[serde(default)]
    message: String,
}

// -- Handlers --

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let mut chat = state.chat.lock().await;
    render_page(&mut chat, &state, None)
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Form(input): Form<ChatInput>,
) -> Result<Response, AppError> {
    let mut chat = state.chat.lock().await;
    match chat.send(&input.message, &state.completion).await? {
        SendOutcome::MissingCredential => {
            let error = Some(MISSING_CREDENTIAL_ERROR.to_string());
            Ok(render_page(&mut chat, &state, error)?.into_response())
        }
        SendOutcome::Ignored | SendOutcome::Replied(_) => Ok(Redirect::to("/").into_response()),
    }
}

/// Render the full page. Also the render pass that repairs a missing system prompt.
fn render_page(
    chat: &mut ChatState,
    state: &AppState,
    error: Option<String>,
) -> Result<Html<String>, AppError> {
    let session = chat.active_view();
    let active_title = session.title.clone();
    let messages = session.visible_messages().map(MessageView::from).collect();

    let selected = chat.direction();
    let directions = Direction::ALL
        .iter()
        .map(|d| DirectionOption {
            slug: d.slug(),
            label: d.label(),
            selected: *d == selected,
        })
        .collect();

    let tmpl = IndexTemplate {
        sessions: chat.summaries(),
        directions,
        api_key: chat.api_key().to_string(),
        model: state.completion.model().to_string(),
        active_title,
        messages,
        error,
    };
    Ok(Html(tmpl.render()?))
}
