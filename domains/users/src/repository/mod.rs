//! Repository implementations for the users domain
//!
//! [`UserStore`] is the seam the services depend on. [`UserRepository`]
//! backs it with Postgres; [`InMemoryUserStore`] keeps users in process
//! for tests and database-less runs.

pub mod memory;
pub mod users;

use async_trait::async_trait;

use chatai_common::Result;

use crate::domain::entities::User;

pub use memory::InMemoryUserStore;
pub use users::UserRepository;

/// Persistence for users, keyed by email
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user (no id yet) or update an existing one.
    /// Returns the stored record with its id. A taken email is a `Conflict`.
    async fn save(&self, user: &User) -> Result<User>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
}
