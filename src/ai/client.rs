//! Chat-completion HTTP client.
//!
//! Thin wrapper around the hosted chat endpoint: builds the request body,
//! authenticates with a bearer key when configured, and pulls the assistant
//! message text out of the response. Tolerant payload parsing lives in
//! [`super::extract`]; this module only speaks the wire protocol.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::extract::truncate_chars;

/// Errors from the chat endpoint boundary.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI provider returned status {status}: {snippet}")]
    Provider { status: u16, snippet: String },
    #[error("failed to reach AI provider: {0}")]
    Network(#[from] reqwest::Error),
    #[error("AI response did not include message content")]
    MissingContent,
    #[error("AI response was not parseable: {0}")]
    Malformed(#[from] super::extract::ExtractError),
    #[error("AI request was cancelled")]
    Cancelled,
    #[error("{0}")]
    Validation(String),
}

/// Chat-completion client configuration.
#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    /// Base URL of the provider, e.g. `https://api.example.com/v1`.
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
}

/// Client for the external chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    config: ChatClientConfig,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageContent,
}

#[derive(Deserialize)]
struct ChatMessageContent {
    content: Option<String>,
}

impl ChatClient {
    pub fn new(config: ChatClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: ChatClientConfig {
                api_base: config.api_base.trim_end_matches('/').to_string(),
                ..config
            },
        }
    }

    /// Sends one completion request and returns the assistant message text.
    ///
    /// The request is abandoned (and reported as [`AiError::Cancelled`]) if
    /// the token fires first; the caller guarantees no state was mutated yet.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.config.api_base);
        let body = json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "stream": false,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ]
        });

        let mut request = self
            .http
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(AiError::Cancelled),
            result = request.json(&body).send() => result?,
        };

        let status = response.status();
        if status != StatusCode::OK {
            let body_text = response.text().await.unwrap_or_default();
            return Err(AiError::Provider {
                status: status.as_u16(),
                snippet: truncate_chars(&body_text, 200),
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AiError::MissingContent)
    }
}
