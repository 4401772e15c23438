//! HTTP client for the Ollama chat API
//!
//! Wraps `POST /api/chat` with non-streaming requests. One client (and its
//! connection pool) is shared by every adapter in a run.

use super::error::{OllamaError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Ollama endpoint
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling options
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatOptions {
    pub temperature: f32,
    /// Output token cap
    pub num_predict: u32,
}

/// Request body for `/api/chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub options: ChatOptions,
    pub stream: bool,
    /// `"json"` constrains the model to emit a JSON document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ChatRequest {
    pub fn new(
        model: impl Into<String>,
        system: impl Into<String>,
        user: impl Into<String>,
        temperature: f32,
        num_predict: u32,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            options: ChatOptions {
                temperature,
                num_predict,
            },
            stream: false,
            format: None,
        }
    }

    pub fn json_format(mut self) -> Self {
        self.format = Some("json".to_string());
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Shared Ollama HTTP client
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| OllamaError::Connection {
                url: base_url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    /// Send one chat request and return the assistant message content.
    pub async fn chat(&self, request: &ChatRequest, timeout: Option<Duration>) -> Result<String> {
        let url = self.chat_url();
        debug!(
            "POST {} (model: {}, temperature: {})",
            url, request.model, request.options.temperature
        );

        let mut builder = self.http.post(&url).json(request);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                OllamaError::Timeout
            } else {
                OllamaError::Connection {
                    url: url.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OllamaError::Http { status, body });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                OllamaError::Timeout
            } else {
                OllamaError::Decode(e.to_string())
            }
        })?;

        parse_chat_response(&body)
    }
}

/// Extract `message.content` from a `/api/chat` response body.
pub(crate) fn parse_chat_response(body: &str) -> Result<String> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| OllamaError::Decode(e.to_string()))?;
    match response.message {
        Some(message) if !message.content.trim().is_empty() => Ok(message.content),
        _ => Err(OllamaError::EmptyResponse),
    }
}
