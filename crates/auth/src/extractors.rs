//! Axum extractors for authentication
//!
//! Generic over any state `S` where `AuthConfig: FromRef<S>`.
//! This is axum's idiomatic nested-state pattern.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::claims::Claims;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::jwt::{extract_bearer_token, validate_jwt_token};

/// Authenticated caller extractor (Bearer JWT)
#[derive(Debug)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let config = AuthConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthorization)?;

        let token = extract_bearer_token(auth_header)?;
        let claims = validate_jwt_token(&token, &config)?;

        Ok(AuthUser(claims))
    }
}
