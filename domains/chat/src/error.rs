//! Chat failures and their HTTP mapping

use axum::response::{IntoResponse, Response};
use chatai_common::Error;
use chatai_llm::LlmError;

use crate::domain::state::StateError;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// No user has the given email (client input error)
    #[error("No user registered with email {0}")]
    UnknownUser(String),

    /// Question or answer is empty after trimming
    #[error("Message {0} must not be blank")]
    BlankMessage(&'static str),

    #[error("Answer generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("Invalid thread state: {0}")]
    State(#[from] StateError),

    /// Store failures, propagated unchanged
    #[error(transparent)]
    Repository(#[from] Error),
}

impl From<ChatError> for Error {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::UnknownUser(_) | ChatError::BlankMessage(_) => {
                Error::Validation(err.to_string())
            }
            ChatError::Generation(_) => Error::Upstream(err.to_string()),
            ChatError::State(_) => Error::Internal(err.to_string()),
            ChatError::Repository(e) => e,
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        Error::from(self).into_response()
    }
}
