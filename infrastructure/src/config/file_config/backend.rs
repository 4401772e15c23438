//! Backend configuration from TOML (`[backend]` section)

use serde::{Deserialize, Serialize};

/// Raw generation backend configuration
///
/// # Example
///
/// ```toml
/// [backend]
/// base_url = "http://localhost:11434"
/// model = "llama3.2"
/// manage_model = true       # pull before the run, stop afterwards
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    pub base_url: String,
    pub model: String,
    pub manage_model: bool,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            base_url: crate::ollama::DEFAULT_BASE_URL.to_string(),
            model: "llama3.2".to_string(),
            manage_model: true,
        }
    }
}
