//! Users domain: registration, credentials, sign-in

pub mod api;
pub mod domain;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{User, UserRole};
pub use domain::password::Password;
pub use repository::{InMemoryUserStore, UserRepository, UserStore};
pub use service::AuthService;

// Re-export API types
pub use api::routes;
pub use api::UsersState;
