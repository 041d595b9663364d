//! Application state for one chat UI: which session is active, the API key,
//! the open session menu and the translation direction, plus every mutation
//! the UI can perform. Each mutation persists the whole store before returning.

use serde::Serialize;

use crate::completion::Completion;
use crate::error::{KamusError, Result};
use crate::model::{Message, Session, SessionMap};
use crate::prompt::{self, Direction};
use crate::store::SessionStore;

/// Inline error shown when the user sends a message without an API key.
pub const MISSING_CREDENTIAL_ERROR: &str = "❌ Masukkan API Key OpenRouter terlebih dahulu.";

/// Sidebar row for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub is_active: bool,
    pub menu_open: bool,
    pub message_count: usize,
}

/// Result of submitting the chat input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// No API key entered; nothing was appended.
    MissingCredential,
    /// The user turn and this reply were appended and saved.
    Replied(String),
}

#[derive(Debug)]
pub struct ChatState {
    store: SessionStore,
    sessions: SessionMap,
    active_id: String,
    api_key: String,
    open_menu: Option<String>,
    direction: Direction,
}

impl ChatState {
    /// Load the store and pick the first session as active, creating one if
    /// the store is empty. Nothing is written until the first mutation.
    pub fn init(store: SessionStore, direction: Direction) -> Result<Self> {
        let mut sessions = store.load()?;
        let active_id = first_or_fresh(&mut sessions);
        tracing::info!(
            "chat: {} session(s) loaded from {}",
            sessions.len(),
            store.path().display()
        );
        Ok(Self {
            store,
            sessions,
            active_id,
            api_key: String::new(),
            open_menu: None,
            direction,
        })
    }

    pub fn sessions(&self) -> &SessionMap {
        &self.sessions
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active(&self) -> Option<&Session> {
        self.sessions.get(&self.active_id)
    }

    pub fn open_menu(&self) -> Option<&str> {
        self.open_menu.as_deref()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Held in memory only.
    pub fn set_api_key(&mut self, key: &str) {
        self.api_key = key.trim().to_string();
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.sessions
            .iter()
            .map(|s| SessionSummary {
                id: s.id.clone(),
                title: s.title.clone(),
                is_active: s.id == self.active_id,
                menu_open: self.open_menu.as_deref() == Some(s.id.as_str()),
                message_count: s.visible_messages().count(),
            })
            .collect()
    }

    pub fn new_session(&mut self) -> Result<String> {
        let session = Session::new();
        let id = session.id.clone();
        self.sessions.insert(session);
        self.active_id = id.clone();
        self.save()?;
        tracing::info!("chat: created session {id}");
        Ok(id)
    }

    pub fn select(&mut self, id: &str) -> Result<()> {
        self.require(id)?;
        self.active_id = id.to_string();
        Ok(())
    }

    /// Open the menu for `id`, or close it if it is the one already open.
    pub fn toggle_menu(&mut self, id: &str) -> Result<()> {
        self.require(id)?;
        self.open_menu = if self.open_menu.as_deref() == Some(id) {
            None
        } else {
            Some(id.to_string())
        };
        Ok(())
    }

    /// Change a session's title. Id and messages are untouched.
    pub fn rename(&mut self, id: &str, title: &str) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(KamusError::InvalidInput("title cannot be empty".into()));
        }
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| KamusError::NotFound(format!("session {id}")))?;
        session.title = title.to_string();
        self.open_menu = None;
        self.save()
    }

    /// Remove a session. Deleting the active one selects the first remaining
    /// session, or a fresh one when none remain.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.sessions
            .remove(id)
            .ok_or_else(|| KamusError::NotFound(format!("session {id}")))?;
        if self.open_menu.as_deref() == Some(id) {
            self.open_menu = None;
        }
        if self.active_id == id || self.sessions.is_empty() {
            self.active_id = first_or_fresh(&mut self.sessions);
        }
        self.save()?;
        tracing::info!("chat: deleted session {id}");
        Ok(())
    }

    /// Switch direction and rewrite the active session's system entry to match.
    pub fn set_direction(&mut self, direction: Direction) -> Result<()> {
        self.direction = direction;
        let prompt = prompt::system_prompt(direction);
        if prompt::apply_system_prompt(&mut self.active_mut().messages, &prompt) {
            self.save()?;
        }
        Ok(())
    }

    /// Render pass: make sure the active session starts with the system entry
    /// for the current direction and return it. The repair is kept in memory
    /// until the next save.
    pub fn active_view(&mut self) -> &Session {
        self.sync_system_prompt();
        self.active_mut()
    }

    /// Append the user's message, ask the model, append its reply.
    /// The store is saved after each append.
    pub async fn send<C: Completion>(&mut self, input: &str, client: &C) -> Result<SendOutcome> {
        if input.trim().is_empty() {
            return Ok(SendOutcome::Ignored);
        }
        if !self.has_api_key() {
            return Ok(SendOutcome::MissingCredential);
        }

        self.sync_system_prompt();
        let session = self.active_mut();
        session.messages.push(Message::user(input));
        let history = session.messages.clone();
        self.save()?;

        let reply = client.complete(&history, &self.api_key).await;

        self.active_mut()
            .messages
            .push(Message::assistant(reply.clone(), client.model()));
        self.save()?;
        Ok(SendOutcome::Replied(reply))
    }

    /// Point the active session's leading system entry at the current
    /// direction. Sessions selected after a direction change pick it up here.
    fn sync_system_prompt(&mut self) {
        let prompt = prompt::system_prompt(self.direction);
        prompt::apply_system_prompt(&mut self.active_mut().messages, &prompt);
    }

    fn save(&self) -> Result<()> {
        self.store.save(&self.sessions)
    }

    fn require(&self, id: &str) -> Result<()> {
        if self.sessions.contains(id) {
            Ok(())
        } else {
            Err(KamusError::NotFound(format!("session {id}")))
        }
    }

    fn active_mut(&mut self) -> &mut Session {
        if !self.sessions.contains(&self.active_id) {
            self.active_id = first_or_fresh(&mut self.sessions);
        }
        match self.sessions.get_mut(&self.active_id) {
            Some(session) => session,
            None => unreachable!("active session exists after repair"),
        }
    }
}

/// Id of the first session, inserting a fresh one if the map is empty.
fn first_or_fresh(sessions: &mut SessionMap) -> String {
    if let Some(first) = sessions.first() {
        return first.id.clone();
    }
    let fresh = Session::new();
    let id = fresh.id.clone();
    sessions.insert(fresh);
    id
}
