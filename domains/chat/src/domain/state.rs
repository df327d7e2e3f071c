//! State machine for thread lifecycle
//!
//! Thread states: New -> Active -> Expired (terminal)
//!
//! Expiry is never stored. It is evaluated lazily from elapsed time when the
//! next message arrives, and an expired thread is replaced rather than revived.

use serde::{Deserialize, Serialize};

/// Errors from state machine transitions
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    #[error("Invalid thread transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadState {
    /// Saved but no message recorded yet
    New,
    /// Receiving messages
    Active,
    /// Idle for at least the timeout
    Expired,
}

impl ThreadState {
    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [ThreadState] {
        match self {
            Self::New => &[Self::Active, Self::Expired],
            Self::Active => &[Self::Active, Self::Expired],
            Self::Expired => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl std::fmt::Display for ThreadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Active => write!(f, "active"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// Events that move a thread through its lifecycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThreadEvent {
    /// A question/answer pair was recorded
    MessageReceived,
    /// The idle timeout elapsed
    TimedOut,
}

impl std::fmt::Display for ThreadEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MessageReceived => write!(f, "message_received"),
            Self::TimedOut => write!(f, "timed_out"),
        }
    }
}

pub struct ThreadStateMachine;

impl ThreadStateMachine {
    /// Attempt a state transition
    pub fn transition(current: ThreadState, event: ThreadEvent) -> Result<ThreadState, StateError> {
        match (current, event) {
            (ThreadState::New | ThreadState::Active, ThreadEvent::MessageReceived) => {
                Ok(ThreadState::Active)
            }
            (ThreadState::New | ThreadState::Active, ThreadEvent::TimedOut) => {
                Ok(ThreadState::Expired)
            }
            (ThreadState::Expired, _) => Err(StateError::InvalidTransition {
                from: current.to_string(),
                event: event.to_string(),
            }),
        }
    }
}
