/// LLM Client: the single point of entry for all language-model calls.
///
/// Speaks the OpenAI-compatible chat-completion protocol (Groq by default).
/// Screening code depends on the `LanguageModel` trait, never on this client
/// directly, so tests can substitute stubs.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LlmSettings;

const MAX_TOKENS: u32 = 1024;
const MAX_RETRIES: u32 = 3;

/// System prompt shared by every screening call.
pub const SCREENING_SYSTEM: &str = "You are an experienced technical recruiter. \
    Judge candidates strictly on the evidence provided. \
    Follow the requested response format exactly.";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No API key configured (set LLM_API_KEY or GROQ_API_KEY)")]
    MissingApiKey,

    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),
}

/// Text-in, text-out language model. Implementations must be safe to call
/// concurrently.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first non-empty choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .iter()
            .filter_map(|c| c.message.content.as_deref())
            .find(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// HTTP language-model client with retry on 429 / 5xx.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    temperature: f32,
}

impl LlmClient {
    /// Fails when no API key is configured or the HTTP client cannot be built.
    pub fn new(settings: &LlmSettings, timeout: Duration) -> Result<Self, LlmError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            api_url: settings.api_url.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw chat-completion call, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: parse_error_message(body),
                });
            }

            let chat_response: ChatResponse = response.json().await?;

            if let Some(usage) = &chat_response.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(chat_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, SCREENING_SYSTEM).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Pulls `error.message` out of an API error body, falling back to the raw body.
fn parse_error_message(body: String) -> String {
    serde_json::from_str::<ApiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: Option<&str>) -> LlmSettings {
        LlmSettings {
            api_key: api_key.map(str::to_string),
            ..LlmSettings::default()
        }
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let result = LlmClient::new(&settings(None), Duration::from_secs(5));
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        let result = LlmClient::new(&settings(Some("   ")), Duration::from_secs(5));
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }

    #[test]
    fn test_client_builds_with_key() {
        let client = LlmClient::new(&settings(Some("gsk_test")), Duration::from_secs(5)).unwrap();
        assert_eq!(client.model(), LlmSettings::default().model);
    }

    #[test]
    fn test_chat_response_text_skips_empty_choices() {
        let json = r#"{
            "choices": [
                {"message": {"content": "  "}},
                {"message": {"content": "Matched: Yes"}}
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3}
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), Some("Matched: Yes"));
    }

    #[test]
    fn test_chat_response_without_usage() {
        let json = r#"{"choices": [{"message": {"content": null}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.usage.is_none());
        assert_eq!(response.text(), None);
    }

    #[test]
    fn test_parse_error_message_from_json() {
        let body = r#"{"error": {"message": "Invalid API Key", "type": "auth"}}"#.to_string();
        assert_eq!(parse_error_message(body), "Invalid API Key");
    }

    #[test]
    fn test_parse_error_message_falls_back_to_body() {
        assert_eq!(parse_error_message("gateway down".to_string()), "gateway down");
    }
}
