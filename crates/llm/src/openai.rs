//! OpenAI Chat Completions Implementation
//!
//! Calls an OpenAI-compatible chat completions endpoint
//! (https://api.openai.com/v1/chat/completions by default) using reqwest.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{LlmConfig, LlmError, LlmMessage, LlmService};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat completions request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [LlmMessage],
}

/// Chat completions response body
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: String,
}

/// OpenAI LLM service implementation
pub struct OpenAiService {
    client: Client,
    config: LlmConfig,
}

impl OpenAiService {
    /// Create a new OpenAI service
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::Configuration(
                "OpenAI API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl LlmService for OpenAiService {
    async fn generate(&self, messages: &[LlmMessage]) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages,
        };

        tracing::info!(
            model = %self.config.model,
            messages = messages.len(),
            "Sending OpenAI chat completion request"
        );

        let response = self
            .client
            .post(&self.config.base_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimit);
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_body) {
                return Err(LlmError::Response(format!(
                    "OpenAI API error ({}): {}",
                    error_response
                        .error
                        .error_type
                        .as_deref()
                        .unwrap_or("unknown"),
                    error_response.error.message
                )));
            }

            return Err(LlmError::Response(format!(
                "OpenAI API returned {}: {}",
                status, error_body
            )));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Response(format!("Failed to parse response: {}", e)))?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or(LlmError::EmptyResponse)?;

        tracing::info!(answer_len = content.len(), "OpenAI chat completion succeeded");

        Ok(content)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
