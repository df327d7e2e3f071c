//! Mock LLM Service Implementation
//!
//! Used by `LlmServiceFactory` when provider is `"mock"`.
//! Returns deterministic, keyword-driven replies for tests and offline runs.

use crate::{LlmError, LlmMessage, LlmRole, LlmService};

const MOCK_MODEL: &str = "mock-model";

/// Mock LLM service for testing
#[derive(Debug, Clone, Default)]
pub struct MockLlmService;

impl MockLlmService {
    /// Create a new mock LLM service
    pub fn new() -> Self {
        Self
    }

    fn reply_to(question: &str) -> &'static str {
        let lower = question.to_lowercase();
        let greeting = lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == "hello" || word == "hi");

        if greeting {
            "Hello! I'm an AI assistant. How can I help you today?"
        } else if lower.contains("name") {
            "I'm ChatAI, an AI assistant."
        } else if lower.contains("weather") {
            "Sorry, I can't provide real-time weather. Please check a weather app or website."
        } else if lower.contains("time") {
            "I can't tell the current time, but your device clock can."
        } else if lower.contains("help") {
            "Sure! I can answer all kinds of questions. Ask me anything."
        } else if question.chars().count() < 5 {
            "Could you be a bit more specific? I can give a better answer then."
        } else {
            "Interesting question! A live model would give a more detailed answer; \
             this is a development mock response."
        }
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn generate(&self, messages: &[LlmMessage]) -> Result<String, LlmError> {
        let last_user_message = messages
            .iter()
            .rev()
            .find(|m| m.role == LlmRole::User)
            .map(|m| m.content.as_str());

        tracing::debug!(question = ?last_user_message, "Mock LLM service generating answer");

        let answer = match last_user_message {
            Some(question) => Self::reply_to(question),
            None => "Sorry, I didn't understand the question.",
        };

        Ok(answer.to_string())
    }

    fn model(&self) -> &str {
        MOCK_MODEL
    }
}
