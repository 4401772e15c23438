//! Error types for the Ollama adapter

use ensemble_application::{BackendError, ContextError};
use thiserror::Error;

/// Result type alias for Ollama operations
pub type Result<T> = std::result::Result<T, OllamaError>;

/// Errors that can occur when talking to an Ollama server or CLI
#[derive(Error, Debug)]
pub enum OllamaError {
    #[error("Failed to connect to Ollama at {url}: {message}")]
    Connection { url: String, message: String },

    #[error("Ollama returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Response carried no message content")]
    EmptyResponse,

    #[error("Failed to run ollama command: {0}")]
    Command(#[from] std::io::Error),

    #[error("ollama {command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
}

impl From<OllamaError> for BackendError {
    fn from(err: OllamaError) -> Self {
        match err {
            OllamaError::Connection { .. } => BackendError::ConnectionError(err.to_string()),
            OllamaError::Http { .. } => BackendError::RequestFailed(err.to_string()),
            OllamaError::Timeout => BackendError::Timeout,
            OllamaError::Decode(_) | OllamaError::EmptyResponse => {
                BackendError::InvalidResponse(err.to_string())
            }
            OllamaError::Command(_) | OllamaError::CommandFailed { .. } => {
                BackendError::Other(err.to_string())
            }
        }
    }
}

impl From<OllamaError> for ContextError {
    fn from(err: OllamaError) -> Self {
        ContextError::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_mapping() {
        assert!(matches!(
            BackendError::from(OllamaError::Timeout),
            BackendError::Timeout
        ));
        assert!(matches!(
            BackendError::from(OllamaError::Http {
                status: 500,
                body: "oops".to_string()
            }),
            BackendError::RequestFailed(_)
        ));
        assert!(matches!(
            BackendError::from(OllamaError::EmptyResponse),
            BackendError::InvalidResponse(_)
        ));
        assert!(matches!(
            BackendError::from(OllamaError::Connection {
                url: "http://localhost:11434".to_string(),
                message: "refused".to_string()
            }),
            BackendError::ConnectionError(_)
        ));
    }
}
