//! Domain entities for the users domain
//!
//! A [`User`] is created once at sign-up and not modified afterwards.
//! Its identity is assigned by the store on first save.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use chatai_common::{Error, Result};

use crate::domain::password::Password;

/// Maximum display name length
pub const MAX_NAME_LENGTH: usize = 100;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    #[default]
    Member,
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Member => write!(f, "MEMBER"),
            UserRole::Admin => write!(f, "ADMIN"),
        }
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    /// `None` until the user has been saved
    pub id: Option<i64>,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub registered_at: DateTime<Utc>,
}

impl User {
    /// Register a new, not yet persisted user.
    ///
    /// Validates the email format and name length and hashes `password`.
    pub fn sign_up(
        email: String,
        password: &str,
        name: String,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if !email.validate_email() {
            return Err(Error::Validation("Invalid email format".to_string()));
        }

        let name = name.trim().to_string();
        if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
            return Err(Error::Validation(format!(
                "Name must be 1-{} characters",
                MAX_NAME_LENGTH
            )));
        }

        let password = Password::new(password)?;

        Ok(User {
            id: None,
            email,
            password_hash: password.into_string(),
            name,
            role,
            registered_at: now,
        })
    }

    /// Check `raw_password` against the stored hash
    pub fn sign_in(&self, raw_password: &str) -> bool {
        Password::from_hash(self.password_hash.clone()).verify(raw_password)
    }

    /// Store-assigned id; fails for a user that was never saved
    pub fn persisted_id(&self) -> Result<i64> {
        self.id
            .ok_or_else(|| Error::Internal(format!("User {} has not been persisted", self.email)))
    }
}
