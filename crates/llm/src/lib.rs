//! Language model backends for ChatAI
//!
//! The conversation core depends only on [`LlmService`]: given an ordered,
//! role-tagged message list it returns the generated answer text.
//! Two implementations are provided:
//! - [`openai::OpenAiService`] calls an OpenAI-compatible chat completions endpoint
//! - [`mock::MockLlmService`] returns deterministic replies for tests and offline runs

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod mock;
pub mod openai;

pub use mock::MockLlmService;
pub use openai::OpenAiService;

/// Model used when no client-specific model is configured
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Chat completions endpoint used when no client-specific URL is configured
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("LLM response error: {0}")]
    Response(String),

    #[error("LLM rate limit exceeded")]
    RateLimit,

    #[error("LLM returned no answer content")]
    EmptyResponse,
}

/// Speaker of a prompt entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for LlmRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmRole::System => write!(f, "system"),
            LlmRole::User => write!(f, "user"),
            LlmRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One role-tagged entry of a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

impl LlmMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::Assistant,
            content: content.into(),
        }
    }
}

/// Answer generation capability
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Generate an answer for the ordered conversation `messages`
    async fn generate(&self, messages: &[LlmMessage]) -> Result<String, LlmError>;

    /// Model identifier this service sends requests to
    fn model(&self) -> &str;
}

/// Resolved credentials and endpoint for one client
#[derive(Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl LlmConfig {
    /// Resolve the configuration for `client_name`.
    ///
    /// Each field is looked up under `CLIENTS_<NAME>_OPENAI_*` first and falls
    /// back to `OPENAI_*`, then to the built-in defaults. The client name
    /// `default` reads only the fallback keys.
    pub fn for_client<F>(client_name: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = client_env_prefix(client_name);
        let resolve = |suffix: &str| {
            prefix
                .as_ref()
                .and_then(|p| lookup(&format!("{}_OPENAI_{}", p, suffix)))
                .or_else(|| lookup(&format!("OPENAI_{}", suffix)))
                .filter(|v| !v.is_empty())
        };

        let config = Self {
            api_key: resolve("API_KEY").unwrap_or_default(),
            model: resolve("MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: resolve("BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };

        tracing::info!(client = %client_name, model = %config.model, "Resolved LLM configuration");
        config
    }
}

fn client_env_prefix(client_name: &str) -> Option<String> {
    let trimmed = client_name.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("default") {
        return None;
    }

    let normalized: String = trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();

    Some(format!("CLIENTS_{}", normalized))
}

/// LLM service factory
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    /// Create an LLM service for `provider` (`openai` or `mock`)
    pub fn create(provider: &str, config: LlmConfig) -> Result<Arc<dyn LlmService>, LlmError> {
        match provider {
            "openai" => {
                tracing::info!(model = %config.model, "Creating OpenAI LLM service");
                Ok(Arc::new(OpenAiService::new(config)?))
            }
            "mock" => {
                tracing::info!("Creating mock LLM service");
                Ok(Arc::new(MockLlmService::new()))
            }
            provider => Err(LlmError::Configuration(format!(
                "Unknown LLM provider: {}. Supported providers: openai, mock",
                provider
            ))),
        }
    }
}
