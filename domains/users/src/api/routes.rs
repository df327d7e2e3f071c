//! Route definitions for the users domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::auth;
use super::middleware::UsersState;

/// Create all users domain routes
pub fn routes() -> Router<UsersState> {
    Router::new()
        .route("/api/v1/auth/sign-up", post(auth::sign_up))
        .route("/api/v1/auth/sign-in", post(auth::sign_in))
        .route("/api/v1/auth/me", get(auth::me))
}
