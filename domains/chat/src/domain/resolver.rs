//! Thread continuation policy

use chrono::{DateTime, Utc};

use crate::domain::entities::{Thread, DEFAULT_TIMEOUT_MINUTES};

/// Decides whether a new message continues the user's latest thread
/// or starts a fresh one.
///
/// Pure: no store access and no clock reads. Persisting the result is up
/// to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadResolver {
    timeout_minutes: i64,
}

impl Default for ThreadResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MINUTES)
    }
}

impl ThreadResolver {
    pub fn new(timeout_minutes: i64) -> Self {
        Self { timeout_minutes }
    }

    pub fn timeout_minutes(&self) -> i64 {
        self.timeout_minutes
    }

    /// Returns `latest` itself when it is still live at `reference`,
    /// otherwise a new unsaved thread for `user_id` started at `reference`.
    pub fn resolve(
        &self,
        user_id: i64,
        latest: Option<Thread>,
        reference: DateTime<Utc>,
    ) -> Thread {
        match latest {
            Some(thread) if !thread.is_expired(reference, self.timeout_minutes) => thread,
            _ => Thread::start(user_id, reference),
        }
    }
}
