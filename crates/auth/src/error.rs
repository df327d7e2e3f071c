//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Authentication error
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingAuthorization,

    #[error("Invalid authorization header format")]
    InvalidAuthorizationFormat,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Failed to create access token")]
    TokenCreation,
}

impl AuthError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::MissingAuthorization => {
                (StatusCode::UNAUTHORIZED, "MISSING_AUTHORIZATION")
            }
            AuthError::InvalidAuthorizationFormat => {
                (StatusCode::UNAUTHORIZED, "INVALID_AUTHORIZATION")
            }
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            AuthError::TokenCreation => {
                (StatusCode::INTERNAL_SERVER_ERROR, "TOKEN_CREATION_ERROR")
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
