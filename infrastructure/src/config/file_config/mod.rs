//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod backend;
mod ensemble;
mod logging;
mod output;
mod requirements;
mod research;

pub use backend::FileBackendConfig;
pub use ensemble::{FileEnsembleConfig, FileStrategyConfig};
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use requirements::FileRequirementsConfig;
pub use research::FileResearchConfig;

use ensemble_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Round loop, worker pool and strategies
    pub ensemble: FileEnsembleConfig,
    /// Generation backend connection
    pub backend: FileBackendConfig,
    /// One-time research step
    pub research: FileResearchConfig,
    /// Structured answer requirements
    pub requirements: FileRequirementsConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Log and transcript destinations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks enum values, strategy entries, requirement bounds, and the
    /// ensemble parameters themselves.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let (params, parse_issues) = self.ensemble.to_params();
        issues.extend(parse_issues);
        issues.extend(params.validate());
        issues.extend(self.ensemble.parse_strategies().1);
        issues.extend(self.requirements.to_requirement_set().1);

        if self.backend.model.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroValue {
                    field: "backend.model".to_string(),
                },
                "backend.model cannot be empty",
            ));
        }

        issues
    }
}
