//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL run transcript
    pub transcript: Option<PathBuf>,
    /// Diagnostic log file (in addition to stderr)
    pub log_file: Option<PathBuf>,
}
