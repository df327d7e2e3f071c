//! Chat domain state

use axum::extract::FromRef;
use chatai_auth::AuthConfig;

use crate::service::ChatService;

/// Application state for the chat domain
#[derive(Clone)]
pub struct ChatState {
    pub chat: ChatService,
    pub auth_config: AuthConfig,
}

impl FromRef<ChatState> for AuthConfig {
    fn from_ref(state: &ChatState) -> Self {
        state.auth_config.clone()
    }
}
