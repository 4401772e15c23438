//! Infrastructure layer for ensemble-quorum
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod ollama;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileBackendConfig, FileConfig, FileEnsembleConfig, FileLoggingConfig,
    FileOutputConfig, FileRequirementsConfig, FileResearchConfig, FileStrategyConfig,
};
pub use logging::JsonlRunLogger;
pub use ollama::{
    DEFAULT_BASE_URL, OllamaClient, OllamaError, OllamaGenerationBackend, OllamaModelManager,
    OllamaResearchProvider,
};
