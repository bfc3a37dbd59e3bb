//! Chat concierge routes.
//!
//! The session cookie holds the chat id; the chat itself lives in
//! [`crate::chatbot::ChatSessions`]. A chat is bound to the subject that
//! started it, so a different token on the same cookie starts a new chat.

use std::convert::Infallible;

use async_stream::stream;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tower_sessions::Session;
use tracing::{debug, instrument};
use uuid::Uuid;

use eshop_core::identity::VerifiedIdentity;

use crate::ai::ChatTurn;
use crate::chatbot::{ChatPhase, ChatState, SharedChat};
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::middleware::session::{CHAT_ID_KEY, CHAT_OWNER_KEY};
use crate::state::AppState;

/// SSE event name for transcript snapshots.
pub const TRANSCRIPT_EVENT: &str = "transcript";

/// Build the chat router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", get(show_chat).delete(end_chat))
        .route("/chat/messages", post(send_message))
        .route("/chat/messages/stream", post(stream_message))
}

/// Visible state of a chat: every turn except the system instruction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub messages: Vec<ChatTurn>,
    pub phase: ChatPhase,
}

impl From<&ChatState> for ChatView {
    fn from(state: &ChatState) -> Self {
        Self {
            messages: state.transcript().conversation().cloned().collect(),
            phase: state.phase(),
        }
    }
}

/// Request body for sending a message.
#[derive(Debug, Deserialize)]
pub struct SendMessage {
    pub message: String,
}

impl SendMessage {
    fn into_text(self) -> Result<String, AppError> {
        if self.message.trim().is_empty() {
            return Err(AppError::BadRequest("message must not be empty".to_string()));
        }
        Ok(self.message)
    }
}

/// Resolve the caller's chat, starting one if needed.
async fn current_chat(
    state: &AppState,
    session: &Session,
    user: &VerifiedIdentity,
) -> Result<SharedChat, AppError> {
    let existing = session.get::<Uuid>(CHAT_ID_KEY).await?;
    let owner = session.get::<String>(CHAT_OWNER_KEY).await?;

    let id = match existing {
        Some(id) if owner.as_deref() == Some(user.subject.as_str()) => id,
        _ => {
            let id = Uuid::new_v4();
            session.insert(CHAT_ID_KEY, id).await?;
            session.insert(CHAT_OWNER_KEY, &user.subject).await?;
            debug!(chat_id = %id, "Assigned new chat to session");
            id
        }
    };

    let provider = state.provider();
    let profile = user.profile.clone();
    Ok(state
        .chats()
        .get_or_start(id, move || ChatState::start(provider, profile))
        .await)
}

/// Show the current transcript.
///
/// GET /chat
async fn show_chat(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<Json<ChatView>, AppError> {
    let chat = current_chat(&state, &session, &user).await?;
    let guard = chat.lock().await;
    Ok(Json(ChatView::from(&*guard)))
}

/// Send a message and wait for the reply.
///
/// POST /chat/messages
#[instrument(skip_all, fields(subject = %user.subject))]
async fn send_message(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Json(body): Json<SendMessage>,
) -> Result<Json<ChatView>, AppError> {
    let text = body.into_text()?;
    let chat = current_chat(&state, &session, &user).await?;

    let mut guard = chat.lock().await;
    guard.submit_user_message(&text, |_| {}).await;
    Ok(Json(ChatView::from(&*guard)))
}

/// Send a message and stream transcript snapshots as the turn progresses.
///
/// POST /chat/messages/stream
///
/// Emits one `transcript` event when the user turn is appended and one when
/// the reply (or apology) lands, then closes.
#[instrument(skip_all, fields(subject = %user.subject))]
async fn stream_message(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Json(body): Json<SendMessage>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let text = body.into_text()?;
    let chat = current_chat(&state, &session, &user).await?;

    let (tx, mut rx) = mpsc::unbounded_channel::<ChatView>();
    tokio::spawn(async move {
        let mut guard = chat.lock().await;
        guard
            .submit_user_message(&text, |s| {
                // Receiver gone means the client disconnected; the turn still completes.
                let _ = tx.send(ChatView::from(s));
            })
            .await;
    });

    let events = stream! {
        while let Some(view) = rx.recv().await {
            yield Ok(transcript_event(&view));
        }
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn transcript_event(view: &ChatView) -> Event {
    Event::default()
        .event(TRANSCRIPT_EVENT)
        .json_data(view)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to serialize transcript");
            Event::default().event("error").data("failed to serialize transcript")
        })
}

/// Discard the caller's chat.
///
/// DELETE /chat
async fn end_chat(
    State(state): State<AppState>,
    session: Session,
    RequireUser(_user): RequireUser,
) -> Result<StatusCode, AppError> {
    if let Some(id) = session.remove::<Uuid>(CHAT_ID_KEY).await? {
        state.chats().remove(&id).await;
        debug!(chat_id = %id, "Chat discarded");
    }
    session.remove::<String>(CHAT_OWNER_KEY).await?;
    Ok(StatusCode::NO_CONTENT)
}
