//! JWT issuance, validation and token extraction helpers

use axum::http::HeaderValue;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::Claims;
use crate::config::AuthConfig;
use crate::error::AuthError;

/// A freshly signed access token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Sign an access token for `user_id` issued at `issued_at`
pub fn issue_token(
    user_id: i64,
    email: &str,
    issued_at: DateTime<Utc>,
    config: &AuthConfig,
) -> Result<IssuedToken, AuthError> {
    let (ttl, expires_at) = Duration::try_minutes(config.token_ttl_minutes)
        .filter(|ttl| *ttl > Duration::zero())
        .and_then(|ttl| Some((ttl, issued_at.checked_add_signed(ttl)?)))
        .ok_or_else(|| {
            tracing::error!(
                ttl_minutes = config.token_ttl_minutes,
                "Token lifetime out of range"
            );
            AuthError::TokenCreation
        })?;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: unix_seconds(issued_at),
        exp: unix_seconds(expires_at),
        iss: config.issuer.clone(),
    };

    let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_ref());
    let token = encode(&Header::new(Algorithm::HS256), &claims, &encoding_key).map_err(|e| {
        tracing::error!(error = %e, user_id, "Failed to sign access token");
        AuthError::TokenCreation
    })?;

    Ok(IssuedToken {
        token,
        expires_in: ttl.num_seconds(),
    })
}

fn unix_seconds(at: DateTime<Utc>) -> u64 {
    u64::try_from(at.timestamp()).unwrap_or(0)
}

/// Validate an access token signed with the configured secret
pub fn validate_jwt_token(token: &str, config: &AuthConfig) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    if let Some(iss) = &config.issuer {
        validation.set_issuer(&[iss]);
    }

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_ref());

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        AuthError::InvalidToken
    })?;

    Ok(token_data.claims)
}

/// Extract bearer token from Authorization header
pub(crate) fn extract_bearer_token(header: &HeaderValue) -> Result<String, AuthError> {
    let header_str = header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    if let Some(token) = header_str.strip_prefix("Bearer ") {
        Ok(token.to_string())
    } else {
        Err(AuthError::InvalidAuthorizationFormat)
    }
}
