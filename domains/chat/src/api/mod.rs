//! HTTP API for the chat domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::ChatState;
pub use routes::routes;
