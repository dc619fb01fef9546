//! OpenAI chat-completions provider.
//!
//! Speaks the `/v1/chat/completions` API, including server-sent-event
//! streaming. Any OpenAI-compatible endpoint works through the base URL.

use super::line_stream;
use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use docqa_core::{AppError, AppResult};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatStreamEvent {
    #[serde(default)]
    model: String,
    choices: Vec<ChatStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatStreamChoice {
    delta: ChatDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI chat-completions client.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client for OpenAI: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn to_chat_request(&self, request: &LlmRequest, stream: bool) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream,
        }
    }

    async fn post(&self, body: &ChatRequest) -> AppResult<reqwest::Response> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to send request to OpenAI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

/// Parse one SSE line. `None` means the line carries no content chunk.
fn parse_sse_line(line: &str) -> Option<AppResult<LlmStreamChunk>> {
    let data = line.strip_prefix("data:")?.trim();

    if data == "[DONE]" {
        return Some(Ok(LlmStreamChunk {
            content: String::new(),
            model: String::new(),
            done: true,
            usage: None,
        }));
    }

    let event: ChatStreamEvent = match serde_json::from_str(data) {
        Ok(event) => event,
        Err(e) => {
            return Some(Err(AppError::Provider(format!(
                "Failed to parse chunk: {}",
                e
            ))))
        }
    };

    let choice = event.choices.into_iter().next()?;
    let content = choice.delta.content.unwrap_or_default();
    if content.is_empty() && choice.finish_reason.is_none() {
        return None;
    }

    Some(Ok(LlmStreamChunk {
        content,
        model: event.model,
        done: false,
        usage: None,
    }))
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(provider = "openai", model = %request.model))]
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!("Sending completion request to OpenAI");

        let response = self.post(&self.to_chat_request(request, false)).await?;
        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse OpenAI response: {}", e)))?;

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Provider("OpenAI returned no choices".to_string()))?;

        let usage = chat
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        tracing::debug!(
            finish_reason = ?choice.finish_reason,
            total_tokens = usage.total_tokens,
            "Received completion from OpenAI"
        );

        Ok(LlmResponse {
            content: choice.message.content,
            model: chat.model,
            usage,
            done: true,
        })
    }

    #[instrument(skip(self, request), fields(provider = "openai", model = %request.model))]
    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::debug!("Starting streaming request to OpenAI");

        let response = self.post(&self.to_chat_request(request, true)).await?;

        let stream = line_stream(response).filter_map(|line| {
            futures::future::ready(match line {
                Ok(line) => parse_sse_line(&line),
                Err(e) => Some(Err(e)),
            })
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiClient {
        OpenAiClient::new(DEFAULT_OPENAI_URL, "sk-test", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_chat_request_includes_system_message() {
        let request = LlmRequest::new("What is Rust?", "gpt-4o-mini").with_system("Be brief");
        let chat = client().to_chat_request(&request, false);

        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert_eq!(chat.messages[1].content, "What is Rust?");
        assert!(!chat.stream);
    }

    #[test]
    fn test_chat_request_without_system() {
        let chat = client().to_chat_request(&LlmRequest::new("Hi", "gpt-4o-mini"), true);
        assert_eq!(chat.messages.len(), 1);
        assert!(chat.stream);
    }

    #[test]
    fn test_parse_sse_content_chunk() {
        let line = r#"data: {"model":"gpt-4o-mini","choices":[{"delta":{"content":"Par"},"finish_reason":null}]}"#;
        let chunk = parse_sse_line(line).unwrap().unwrap();
        assert_eq!(chunk.content, "Par");
        assert!(!chunk.done);
    }

    #[test]
    fn test_parse_sse_done_marker() {
        let chunk = parse_sse_line("data: [DONE]").unwrap().unwrap();
        assert!(chunk.done);
    }

    #[test]
    fn test_parse_sse_ignores_role_only_delta() {
        let line = r#"data: {"model":"gpt-4o-mini","choices":[{"delta":{"role":"assistant"}}]}"#;
        assert!(parse_sse_line(line).is_none());
        assert!(parse_sse_line(": keep-alive").is_none());
    }

    #[test]
    fn test_parse_sse_malformed() {
        assert!(matches!(
            parse_sse_line("data: {not json"),
            Some(Err(AppError::Provider(_)))
        ));
    }
}
