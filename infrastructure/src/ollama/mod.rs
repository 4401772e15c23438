//! Ollama adapters
//!
//! HTTP chat client plus the generation backend, research provider and
//! model lifecycle manager built on it.

pub mod client;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod research;

pub use client::{DEFAULT_BASE_URL, OllamaClient};
pub use error::OllamaError;
pub use gateway::OllamaGenerationBackend;
pub use lifecycle::OllamaModelManager;
pub use research::OllamaResearchProvider;
