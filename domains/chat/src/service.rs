//! Send-message workflow
//!
//! [`ChatService::send_message`] looks up the sender, resolves and saves the
//! thread, replays its history to the language model and records the new
//! question/answer pair.
//!
//! Messages from the same user are handled one at a time within a process:
//! each user id maps to an async mutex held from the thread lookup until the
//! thread is touched. The entry is dropped again once nobody holds or awaits
//! it. Separate processes sharing a database do not coordinate, so two
//! replicas can still both start a thread for the same user.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;

use chatai_llm::{LlmError, LlmService};
use chatai_users::UserStore;

use crate::domain::entities::{Message, Thread};
use crate::domain::prompt::build_prompt;
use crate::domain::resolver::ThreadResolver;
use crate::domain::state::{ThreadEvent, ThreadStateMachine};
use crate::error::ChatError;
use crate::repository::{ChatRepositories, MessageStore, ThreadStore};

/// Result of one send-message request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub thread_id: i64,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

type UserLocks = Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>;

/// Exclusive turn of one user; releasing it prunes the idle lock entry
struct UserTurn {
    user_id: i64,
    locks: Arc<UserLocks>,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for UserTurn {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Waiters hold their own clone, so a count of one means only the map
        if locks
            .get(&self.user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.user_id);
        }
    }
}

/// Conversation orchestrator
#[derive(Clone)]
pub struct ChatService {
    users: Arc<dyn UserStore>,
    threads: Arc<dyn ThreadStore>,
    messages: Arc<dyn MessageStore>,
    llm: Arc<dyn LlmService>,
    clock: Arc<dyn Clock>,
    resolver: ThreadResolver,
    user_locks: Arc<UserLocks>,
}

impl ChatService {
    pub fn new(
        users: Arc<dyn UserStore>,
        repos: ChatRepositories,
        llm: Arc<dyn LlmService>,
        clock: Arc<dyn Clock>,
        resolver: ThreadResolver,
    ) -> Self {
        Self {
            users,
            threads: repos.threads,
            messages: repos.messages,
            llm,
            clock,
            resolver,
            user_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Answer `question` from the user registered as `user_email`.
    ///
    /// A blank question is rejected before anything is read or written. If
    /// answer generation fails the thread saved in step 3 stays behind
    /// without a message.
    pub async fn send_message(
        &self,
        user_email: &str,
        question: &str,
    ) -> Result<ChatReply, ChatError> {
        if question.trim().is_empty() {
            return Err(ChatError::BlankMessage("question"));
        }

        // 1. Sender
        let user = self
            .users
            .find_by_email(user_email)
            .await?
            .ok_or_else(|| ChatError::UnknownUser(user_email.to_string()))?;
        let user_id = user.persisted_id()?;

        let _turn = self.take_turn(user_id).await;

        // 2-3. Continue or start a thread, and save it so it has an id
        let latest = self.threads.find_latest_for_user(user_id).await?;
        let now = self.clock.utc();
        let resolved = self.resolver.resolve(user_id, latest, now);
        let started = resolved.id.is_none();
        let thread = self.threads.save(&resolved.touch(now)).await?;
        let thread_id = thread.persisted_id()?;

        tracing::debug!(user_id, thread_id, started, "Thread resolved");

        // 4. History, oldest first
        let history = self.messages.find_by_thread_chronological(thread_id).await?;
        let thread = thread.with_history(history);
        let state = thread.state_at(now, self.resolver.timeout_minutes());

        // 5-6. Prompt and answer
        let prompt = build_prompt(&thread.messages, question);
        let answer = self.llm.generate(&prompt).await.map_err(|e| {
            tracing::error!(
                error = %e,
                user_id,
                thread_id,
                model = %self.llm.model(),
                "Answer generation failed"
            );
            ChatError::Generation(e)
        })?;
        if answer.trim().is_empty() {
            tracing::error!(
                user_id,
                thread_id,
                model = %self.llm.model(),
                "Language model returned a blank answer"
            );
            return Err(ChatError::Generation(LlmError::EmptyResponse));
        }

        // 7-8. Record the exchange
        let next_state = ThreadStateMachine::transition(state, ThreadEvent::MessageReceived)?;
        let message = Message::create(thread_id, question.to_string(), answer, self.clock.utc())?;
        let saved = self.messages.save(&message).await?;

        // 9. Touch the thread
        let thread = thread
            .with_message(saved.clone())
            .touch(self.clock.utc());
        self.threads.save(&thread).await?;

        tracing::info!(
            user_id,
            thread_id,
            state = %next_state,
            messages = thread.messages.len(),
            "Chat message recorded"
        );

        Ok(ChatReply {
            thread_id,
            question: saved.question,
            answer: saved.answer,
            created_at: saved.created_at,
        })
    }

    /// Latest thread of user `user_id`, with its messages
    pub async fn latest_thread(&self, user_id: i64) -> Result<Option<Thread>, ChatError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ChatError::UnknownUser(user_id.to_string()))?;

        let Some(thread) = self
            .threads
            .find_latest_for_user(user.persisted_id()?)
            .await?
        else {
            return Ok(None);
        };

        let history = self
            .messages
            .find_by_thread_chronological(thread.persisted_id()?)
            .await?;
        Ok(Some(thread.with_history(history)))
    }

    async fn take_turn(&self, user_id: i64) -> UserTurn {
        let lock = {
            let mut locks = self
                .user_locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.entry(user_id).or_default().clone()
        };

        UserTurn {
            user_id,
            locks: self.user_locks.clone(),
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn tracked_users(&self) -> usize {
        self.user_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
