//! Chat domain: time-bounded threads, question/answer messages, answer generation

pub mod api;
pub mod domain;
pub mod error;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Message, Thread, DEFAULT_TIMEOUT_MINUTES};
pub use domain::prompt::{build_prompt, SYSTEM_PERSONA};
pub use domain::resolver::ThreadResolver;
pub use domain::state::{StateError, ThreadEvent, ThreadState, ThreadStateMachine};
pub use error::ChatError;

// Re-export repository types
pub use repository::{
    ChatRepositories, InMemoryMessageStore, InMemoryThreadStore, MessageRepository,
    MessageStore, ThreadRepository, ThreadStore,
};
pub use service::{ChatReply, ChatService};

// Re-export API types
pub use api::routes;
pub use api::ChatState;
