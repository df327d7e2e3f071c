//! Route definitions for the chat domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::messages;
use super::middleware::ChatState;

/// Create all chat domain routes
pub fn routes() -> Router<ChatState> {
    Router::new()
        .route("/api/v1/chat/message", post(messages::send_message))
        .route("/api/v1/chat/threads/latest", get(messages::latest_thread))
}
