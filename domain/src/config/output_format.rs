//! Output format value object

use serde::{Deserialize, Serialize};

/// How a finished ensemble run is rendered for the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Only the selected answer (default)
    #[default]
    Answer,
    /// Every round's candidates, cluster support and the decision
    Full,
    /// JSON output
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "answer" => Ok(OutputFormat::Answer),
            "full" => Ok(OutputFormat::Full),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "Unknown output format: {}. Valid: answer, full, json",
                other
            )),
        }
    }
}
