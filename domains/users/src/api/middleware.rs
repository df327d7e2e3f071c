//! Users domain state

use axum::extract::FromRef;
use chatai_auth::AuthConfig;

use crate::service::AuthService;

/// Application state for the users domain
#[derive(Clone)]
pub struct UsersState {
    pub auth: AuthService,
    pub auth_config: AuthConfig,
}

impl FromRef<UsersState> for AuthConfig {
    fn from_ref(state: &UsersState) -> Self {
        state.auth_config.clone()
    }
}
