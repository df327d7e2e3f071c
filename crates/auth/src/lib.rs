//! Authentication for the ChatAI API
//!
//! Issues and validates HS256 access tokens and provides an axum extractor
//! that works with any state implementing `FromRef<S>` for `AuthConfig`.

mod claims;
mod config;
mod error;
mod extractors;
mod jwt;

pub use claims::Claims;
pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::AuthUser;
pub use jwt::{issue_token, validate_jwt_token, IssuedToken};
