//! services/api/src/web/chat.rs
//!
//! Chat endpoints: session lifecycle, message append, and the LLM-backed
//! send-and-reply operation.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::error::{HttpError, HttpResult};
use crate::web::state::AppState;
use leximate_core::domain::{ChatMessage, ChatSession, Sender};
use leximate_core::ports::ensure_owner;

/// The reply stored when the generation service fails; the request itself
/// still succeeds.
const GENERATION_FAILURE_REPLY: &str = "Error: Unable to generate response";

/// Synthesized (never persisted) first message for an empty session.
const GREETING: &str = "Hello! I'm your LexiMate AI assistant. I'm here to help you with \
legal questions. How can I assist you today?";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SaveMessageRequest {
    pub session_id: Option<String>,
    pub message: Option<String>,
    pub sender: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatSessionResponse {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ChatSession> for ChatSessionResponse {
    fn from(session: ChatSession) -> Self {
        Self {
            id: session.id,
            title: session.title,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

/// A message as returned to clients. The synthesized greeting has no owner
/// and no timestamp, so both are optional here.
#[derive(Serialize, ToSchema)]
pub struct ChatMessageResponse {
    pub session_id: Uuid,
    pub user_id: Option<Uuid>,
    pub sender: String,
    pub message: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(msg: ChatMessage) -> Self {
        Self {
            session_id: msg.session_id,
            user_id: Some(msg.user_id),
            sender: msg.sender,
            message: msg.message,
            timestamp: Some(msg.created_at),
        }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn parse_session_id(raw: &str) -> Result<Uuid, HttpError> {
    Uuid::parse_str(raw).map_err(|_| HttpError::bad_request("Invalid session id"))
}

/// Fetches a session and verifies the caller owns it.
async fn owned_session(
    state: &AppState,
    session_id: Uuid,
    user_id: Uuid,
) -> HttpResult<ChatSession> {
    let session = state.db.get_chat_session(session_id).await?;
    ensure_owner(session.user_id, user_id)?;
    Ok(session)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /startChat - Create a new chat session
#[utoipa::path(
    post,
    path = "/startChat",
    responses(
        (status = 200, description = "Session created"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn start_chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> HttpResult<impl IntoResponse> {
    let session = state.db.create_chat_session(user_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "session_id": session.id,
    })))
}

/// POST /chat - Append a user message and generate the assistant's reply
///
/// The generation call is stateless: only the raw user text is sent. A
/// generation failure is absorbed into a placeholder reply; the request
/// never fails on account of the upstream model.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "The assistant's reply"),
        (status = 400, description = "Missing fields or malformed session id"),
        (status = 403, description = "Caller does not own the session"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<ChatRequest>,
) -> HttpResult<impl IntoResponse> {
    let (session_raw, message) = match (req.session_id, req.message) {
        (Some(s), Some(m)) if !m.is_empty() => (s, m),
        _ => return Err(HttpError::bad_request("Missing fields")),
    };
    let session_id = parse_session_id(&session_raw)?;
    owned_session(&state, session_id, user_id).await?;

    state
        .db
        .insert_chat_message(session_id, user_id, Sender::User, &message)
        .await?;

    let reply = match state.chat_adapter.generate_reply(&message).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Chat generation failed: {}", e);
            GENERATION_FAILURE_REPLY.to_string()
        }
    };

    state
        .db
        .insert_chat_message(session_id, user_id, Sender::Assistant, &reply)
        .await?;
    state.db.touch_chat_session(session_id).await?;

    Ok(Json(serde_json::json!({ "reply": reply })))
}

/// POST /saveMessage - Persist a message without generating a reply
#[utoipa::path(
    post,
    path = "/saveMessage",
    request_body = SaveMessageRequest,
    responses(
        (status = 200, description = "Message saved"),
        (status = 400, description = "Missing fields, bad sender, or malformed session id"),
        (status = 403, description = "Caller does not own the session"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn save_message_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<SaveMessageRequest>,
) -> HttpResult<impl IntoResponse> {
    let (session_raw, message, sender_raw) = match (req.session_id, req.message, req.sender) {
        (Some(s), Some(m), Some(r)) if !m.is_empty() => (s, m, r),
        _ => return Err(HttpError::bad_request("Missing fields")),
    };
    let sender = Sender::parse(&sender_raw)
        .ok_or_else(|| HttpError::bad_request("Invalid sender"))?;
    let session_id = parse_session_id(&session_raw)?;
    owned_session(&state, session_id, user_id).await?;

    state
        .db
        .insert_chat_message(session_id, user_id, sender, &message)
        .await?;
    state.db.touch_chat_session(session_id).await?;

    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /chatHistory - The caller's sessions
#[utoipa::path(
    get,
    path = "/chatHistory",
    responses(
        (status = 200, description = "The caller's chat sessions"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn chat_history_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> HttpResult<impl IntoResponse> {
    let sessions = state.db.list_chat_sessions(user_id).await?;
    let chats: Vec<ChatSessionResponse> = sessions.into_iter().map(Into::into).collect();
    Ok(Json(serde_json::json!({
        "success": true,
        "chats": chats,
    })))
}

/// GET /getMessages/{id} - A session's messages, oldest first
///
/// A session with no stored messages yields a single synthesized greeting;
/// a non-empty result therefore does not imply persisted history.
#[utoipa::path(
    get,
    path = "/getMessages/{id}",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Ordered messages"),
        (status = 400, description = "Malformed session id"),
        (status = 403, description = "Caller does not own the session"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn get_messages_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(session_raw): Path<String>,
) -> HttpResult<impl IntoResponse> {
    let session_id = parse_session_id(&session_raw)?;
    owned_session(&state, session_id, user_id).await?;

    let stored = state.db.list_chat_messages(session_id).await?;
    let messages: Vec<ChatMessageResponse> = if stored.is_empty() {
        vec![ChatMessageResponse {
            session_id,
            user_id: None,
            sender: Sender::Assistant.as_str().to_string(),
            message: GREETING.to_string(),
            timestamp: None,
        }]
    } else {
        stored.into_iter().map(Into::into).collect()
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "messages": messages,
    })))
}

/// DELETE /deleteChat/{id} - Delete a session and its messages
///
/// Deletion is keyed on both session id and owner; a mismatch silently
/// deletes nothing and still reports success.
#[utoipa::path(
    delete,
    path = "/deleteChat/{id}",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Chat deleted"),
        (status = 400, description = "Malformed session id"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn delete_chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(session_raw): Path<String>,
) -> HttpResult<impl IntoResponse> {
    let session_id = parse_session_id(&session_raw)?;
    state.db.delete_chat_session(session_id, user_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Chat deleted",
    })))
}
