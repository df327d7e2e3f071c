//! Chat message API handlers

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use chatai_auth::AuthUser;
use chatai_common::{Error, Result, ValidatedJson};

use crate::api::middleware::ChatState;
use crate::domain::entities::{Message, Thread};
use crate::service::ChatReply;

/// Request for sending a message
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[validate(email)]
    pub user_email: String,

    /// Whitespace-only text passes here and is rejected by the service
    pub question: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Option<i64>,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            question: m.question,
            answer: m.answer,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResponse {
    pub id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<MessageResponse>,
}

impl From<Thread> for ThreadResponse {
    fn from(t: Thread) -> Self {
        Self {
            id: t.id,
            created_at: t.created_at,
            updated_at: t.updated_at,
            messages: t.messages.into_iter().map(Into::into).collect(),
        }
    }
}

/// POST /api/v1/chat/message
pub async fn send_message(
    State(state): State<ChatState>,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<Json<ChatReply>> {
    let reply = state
        .chat
        .send_message(&req.user_email, &req.question)
        .await?;

    Ok(Json(reply))
}

/// GET /api/v1/chat/threads/latest
///
/// Only ever returns the caller's own history.
pub async fn latest_thread(
    State(state): State<ChatState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ThreadResponse>> {
    let user_id = claims
        .user_id()
        .ok_or_else(|| Error::Authentication("Token subject is not a user id".to_string()))?;

    let thread = state
        .chat
        .latest_thread(user_id)
        .await?
        .ok_or_else(|| Error::NotFound("No conversation yet".to_string()))?;

    Ok(Json(thread.into()))
}
