use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::{BackendError, CompletionRequest, GenerationOptions, TextBackend};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Live backend for OpenAI-compatible chat-completion endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiBackend {
    pub fn new(api_key: impl Into<String>, options: &GenerationOptions) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: options.model.clone(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: options.timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });
        ChatRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// One request/response exchange, through body parsing. No deadline of
    /// its own; `complete` wraps it.
    async fn dispatch(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let body = self.build_body(request);
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to reach completion endpoint");
                BackendError::Transient(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "Completion endpoint returned error");
            return Err(BackendError::from_status(status.as_u16(), text));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse completion response");
            BackendError::Transient(format!("failed to parse response: {}", e))
        })?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl TextBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        debug!(
            model = %self.model,
            prompt_len = request.prompt.len(),
            "Sending completion request"
        );

        // The deadline covers the whole call, body reads included; a backend
        // that sends headers promptly and then stalls the body still trips
        // it.
        let content = tokio::time::timeout(self.timeout, self.dispatch(request))
            .await
            .map_err(|_| {
                error!(timeout_secs = self.timeout.as_secs(), "Completion call timed out");
                BackendError::Transient(format!(
                    "request timed out after {:?}",
                    self.timeout
                ))
            })??;

        if content.trim().is_empty() {
            return Err(BackendError::Empty);
        }

        debug!(chars = content.len(), "Received completion");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal server that returns headers immediately, then stalls the body.
    async fn spawn_stalling_server() -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\n\
                      content-type: application/json\r\n\
                      content-length: 4096\r\n\r\n{",
                )
                .await;
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        addr
    }

    #[tokio::test]
    async fn stalled_response_body_surfaces_as_transient_after_timeout() {
        let addr = spawn_stalling_server().await;

        let options = GenerationOptions::default().with_timeout(Duration::from_millis(200));
        let backend = OpenAiBackend::new("test-key", &options)
            .with_base_url(format!("http://{}/v1/chat/completions", addr));

        let request = CompletionRequest::new("tell a story", 0.5, 64);
        let err = backend.complete(&request).await.unwrap_err();

        assert!(matches!(err, BackendError::Transient(_)));
        assert!(err.is_retryable());
    }
}
