//! Answer requirements from TOML (`[requirements]` section)
//!
//! ```toml
//! [requirements]
//! precision = 5          # decimal digits
//! allow_exact = false    # let exact forms (pi, 1/3) satisfy precision
//! format = "decimal"     # "integer", "decimal" or "fraction"
//! min = 0.0
//! max = 10.0
//! ```

use ensemble_domain::{
    ConfigIssue, ConfigIssueCode, FormatClass, Requirement, RequirementSet,
};
use serde::{Deserialize, Serialize};

/// Raw requirement configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRequirementsConfig {
    pub precision: Option<usize>,
    pub allow_exact: bool,
    pub format: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FileRequirementsConfig {
    /// Build the requirement set, reporting entries that could not be used.
    pub fn to_requirement_set(&self) -> (RequirementSet, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut set = RequirementSet::empty();

        if let Some(digits) = self.precision {
            set = set.with(Requirement::Precision {
                digits,
                allow_exact: self.allow_exact,
            });
        }

        if let Some(format) = &self.format {
            match format.parse::<FormatClass>() {
                Ok(class) => set = set.with(Requirement::format(class)),
                Err(_) => issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "requirements.format".to_string(),
                        value: format.clone(),
                        valid_values: vec![
                            "integer".to_string(),
                            "decimal".to_string(),
                            "fraction".to_string(),
                        ],
                    },
                    format!("requirements.format: unknown value '{}'", format),
                )),
            }
        }

        if self.min.is_some() || self.max.is_some() {
            match Requirement::domain(self.min, self.max) {
                Ok(requirement) => set = set.with(requirement),
                Err(e) => issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvertedRange {
                        field: "requirements".to_string(),
                    },
                    format!("requirements: {}", e),
                )),
            }
        }

        (set, issues)
    }
}
