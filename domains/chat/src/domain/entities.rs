//! Domain entities for the chat domain
//!
//! Threads and messages are values: every change produces a new value built
//! from the old one. Identity is the store-assigned `id`, so a thread returned
//! unchanged keeps its identity while a freshly started thread has none until
//! it is saved.

use chrono::{DateTime, Utc};

use crate::domain::state::ThreadState;
use crate::error::ChatError;

/// Idle minutes after which a thread no longer accepts messages
pub const DEFAULT_TIMEOUT_MINUTES: i64 = 30;

/// One question/answer exchange
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Message {
    /// `None` until the message has been saved
    pub id: Option<i64>,
    pub thread_id: i64,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build an unsaved message. Both texts must contain non-whitespace.
    pub fn create(
        thread_id: i64,
        question: String,
        answer: String,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ChatError> {
        if question.trim().is_empty() {
            return Err(ChatError::BlankMessage("question"));
        }
        if answer.trim().is_empty() {
            return Err(ChatError::BlankMessage("answer"));
        }

        Ok(Message {
            id: None,
            thread_id,
            question,
            answer,
            created_at,
        })
    }
}

/// A time-bounded conversation owned by one user
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Thread {
    /// `None` until the thread has been saved
    pub id: Option<i64>,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Chronological; loaded separately from the message store
    #[sqlx(skip)]
    pub messages: Vec<Message>,
}

impl Thread {
    /// Start an empty, unsaved thread for `user_id` at `now`
    pub fn start(user_id: i64, now: DateTime<Utc>) -> Self {
        Thread {
            id: None,
            user_id,
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    /// Whether at least `timeout_minutes` whole minutes passed between the
    /// last update and `reference`
    pub fn is_expired(&self, reference: DateTime<Utc>, timeout_minutes: i64) -> bool {
        (reference - self.updated_at).num_minutes() >= timeout_minutes
    }

    /// Lifecycle position of this thread as seen at `reference`
    pub fn state_at(&self, reference: DateTime<Utc>, timeout_minutes: i64) -> ThreadState {
        if self.is_expired(reference, timeout_minutes) {
            ThreadState::Expired
        } else if self.messages.is_empty() {
            ThreadState::New
        } else {
            ThreadState::Active
        }
    }

    /// Copy with `updated_at` moved to `at` (never before `created_at`)
    pub fn touch(&self, at: DateTime<Utc>) -> Self {
        Thread {
            updated_at: at.max(self.created_at),
            ..self.clone()
        }
    }

    /// Copy with `message` appended
    pub fn with_message(&self, message: Message) -> Self {
        let mut messages = self.messages.clone();
        messages.push(message);
        Thread {
            messages,
            ..self.clone()
        }
    }

    /// Copy carrying `history` as its messages
    pub fn with_history(self, history: Vec<Message>) -> Self {
        Thread {
            messages: history,
            ..self
        }
    }

    /// Store-assigned id; fails for a thread that was never saved
    pub fn persisted_id(&self) -> Result<i64, ChatError> {
        self.id.ok_or_else(|| {
            ChatError::Repository(chatai_common::Error::Internal(
                "Thread has not been persisted".to_string(),
            ))
        })
    }
}
