use std::time::Duration;

use async_trait::async_trait;
use pipeline::ports::{CompletionRequest, LanguageModel, LlmError, OutputSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{endpoint, http_client, retry_after};

/// Chat completions against an Ollama server.
pub struct OllamaChat {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a Value>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaChat {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http = http_client(timeout).map_err(|e| LlmError::Transport {
            message: e.to_string(),
        })?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    async fn chat(
        &self,
        request: &CompletionRequest,
        format: Option<&Value>,
    ) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            stream: false,
            options: request
                .temperature
                .map(|temperature| ChatOptions { temperature }),
            format,
        };

        debug!(model = %self.model, structured = format.is_some(), "sending chat request");

        let response = self
            .http
            .post(endpoint(&self.base_url, "/api/chat"))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
                retry_after,
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| LlmError::MalformedResponse {
                    message: format!("failed to parse chat response: {e}"),
                })?;

        parsed
            .message
            .map(|m| m.content)
            .ok_or_else(|| LlmError::MalformedResponse {
                message: "chat response has no message".to_string(),
            })
    }
}

#[async_trait]
impl LanguageModel for OllamaChat {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.chat(request, None).await
    }

    async fn complete_structured(
        &self,
        request: &CompletionRequest,
        schema: &OutputSchema,
    ) -> Result<Value, LlmError> {
        let content = self.chat(request, Some(&schema.schema)).await?;
        serde_json::from_str(&content).map_err(|e| LlmError::MalformedResponse {
            message: format!("{} output is not valid JSON: {e}", schema.name),
        })
    }
}
