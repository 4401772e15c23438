//! Research configuration from TOML (`[research]` section)

use serde::{Deserialize, Serialize};

/// Raw research step configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileResearchConfig {
    /// Run the one-time research step before round 0
    pub enabled: bool,
    /// Model for the research step (defaults to `[backend].model`)
    pub model: Option<String>,
    pub timeout_secs: u64,
}

impl Default for FileResearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: None,
            timeout_secs: 120,
        }
    }
}
