//! Generation backend port
//!
//! Defines the interface for obtaining one candidate answer from a noisy
//! producer (typically an LLM). Implementations (adapters) live in the
//! infrastructure layer.

use async_trait::async_trait;
use ensemble_domain::Strategy;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a generation call
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Everything a backend needs for one call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub strategy: Strategy,
    /// Persona plus answer-format instruction
    pub system_prompt: String,
    /// Question plus rendered research context
    pub prompt: String,
    pub temperature: f32,
    /// Output token cap
    pub max_output: u32,
    /// The caller enforces this too; backends may pass it to their transport.
    pub deadline: Duration,
}

/// A producer of raw candidate text.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one generation and return the raw response text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError>;
}
