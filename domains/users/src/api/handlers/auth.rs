//! Authentication API handlers
//!
//! Implements:
//! - POST /api/v1/auth/sign-up - Register a member account
//! - POST /api/v1/auth/sign-in - Exchange credentials for an access token
//! - GET /api/v1/auth/me - Return the caller's profile

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chatai_auth::AuthUser;
use chatai_common::{Error, Result, ValidatedJson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::middleware::UsersState;
use crate::domain::entities::{User, UserRole};

const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Public view of a user (never includes the password hash)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Option<i64>,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub registered_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            registered_at: user.registered_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8))]
    pub password: String,

    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// POST /api/v1/auth/sign-up
pub async fn sign_up(
    State(state): State<UsersState>,
    ValidatedJson(request): ValidatedJson<SignUpRequest>,
) -> Result<impl IntoResponse> {
    let user = state
        .auth
        .sign_up(request.email, &request.password, request.name)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /api/v1/auth/sign-in
pub async fn sign_in(
    State(state): State<UsersState>,
    ValidatedJson(request): ValidatedJson<SignInRequest>,
) -> Result<Json<TokenResponse>> {
    let issued = state.auth.sign_in(&request.email, &request.password).await?;

    Ok(Json(TokenResponse {
        access_token: issued.token,
        token_type: TOKEN_TYPE_BEARER,
        expires_in: issued.expires_in,
    }))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<UsersState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<UserResponse>> {
    let user_id = claims
        .user_id()
        .ok_or_else(|| Error::Authentication("Token subject is not a user id".to_string()))?;

    let user = state.auth.current_user(user_id).await?;
    Ok(Json(UserResponse::from(user)))
}
