//! Repository implementations for the chat domain
//!
//! The orchestrator only sees the [`ThreadStore`] and [`MessageStore`]
//! traits. Postgres repositories back them in deployment; the in-memory
//! stores serve tests and database-less runs.

pub mod memory;
pub mod messages;
pub mod threads;

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use chatai_common::Result;

use crate::domain::entities::{Message, Thread};

pub use memory::{InMemoryMessageStore, InMemoryThreadStore};
pub use messages::MessageRepository;
pub use threads::ThreadRepository;

#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Insert an unsaved thread or update `updated_at` of a saved one.
    /// Returns the stored thread with its id; `messages` are carried over.
    async fn save(&self, thread: &Thread) -> Result<Thread>;

    /// Most recently updated thread of `user_id`
    async fn find_latest_for_user(&self, user_id: i64) -> Result<Option<Thread>>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert a new message and return it with its id
    async fn save(&self, message: &Message) -> Result<Message>;

    /// Messages of `thread_id`, oldest first
    async fn find_by_thread_chronological(&self, thread_id: i64) -> Result<Vec<Message>>;
}

/// Store handles for the chat domain
#[derive(Clone)]
pub struct ChatRepositories {
    pub threads: Arc<dyn ThreadStore>,
    pub messages: Arc<dyn MessageStore>,
}

impl ChatRepositories {
    /// Postgres-backed stores sharing `pool`
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            threads: Arc::new(ThreadRepository::new(pool.clone())),
            messages: Arc::new(MessageRepository::new(pool)),
        }
    }

    /// Empty in-process stores
    pub fn in_memory() -> Self {
        Self {
            threads: Arc::new(InMemoryThreadStore::new()),
            messages: Arc::new(InMemoryMessageStore::new()),
        }
    }
}
