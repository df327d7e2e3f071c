//! Sign-up and sign-in flows

use std::sync::Arc;

use mockable::Clock;

use chatai_auth::{issue_token, AuthConfig, IssuedToken};
use chatai_common::{Error, Result};

use crate::domain::entities::{User, UserRole};
use crate::repository::UserStore;

/// Registration and credential checks over a [`UserStore`]
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, clock: Arc<dyn Clock>, config: AuthConfig) -> Self {
        Self {
            users,
            clock,
            config,
        }
    }

    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    /// Register a member account. A taken email is a `Conflict`.
    pub async fn sign_up(&self, email: String, password: &str, name: String) -> Result<User> {
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(Error::Conflict(format!(
                "A user with email {} already exists",
                email
            )));
        }

        let user = User::sign_up(email, password, name, UserRole::Member, self.clock.utc())?;
        let saved = self.users.save(&user).await?;

        tracing::info!(user_id = ?saved.id, "User signed up");
        Ok(saved)
    }

    /// Check credentials and issue an access token
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedToken> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| Error::Validation(format!("No user registered with email {}", email)))?;

        if !user.sign_in(password) {
            tracing::debug!(user_id = ?user.id, "Sign-in rejected: wrong password");
            return Err(Error::Authentication("Invalid email or password".to_string()));
        }

        let user_id = user.persisted_id()?;
        let token = issue_token(user_id, &user.email, self.clock.utc(), &self.config)
            .map_err(|e| Error::Internal(e.to_string()))?;

        tracing::info!(user_id, "User signed in");
        Ok(token)
    }

    /// Load the user a validated token was issued to
    pub async fn current_user(&self, user_id: i64) -> Result<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::Authentication("Token subject no longer exists".to_string()))
    }
}
