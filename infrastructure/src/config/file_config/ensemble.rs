//! Ensemble configuration from TOML (`[ensemble]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [ensemble]
//! initial_runs = 10
//! extra_per_round = 1
//! max_rounds = 5
//! max_workers = 4
//! temperature_min = 0.3
//! temperature_max = 0.5
//! max_output = 300
//! call_timeout_secs = 60
//! selection = "uniform"        # or "indexed"
//! seed = 42
//!
//! [[ensemble.strategies]]
//! name = "direct"
//! persona = "You are a calculator. Give only the result."
//! ```

use ensemble_application::EnsembleParams;
use ensemble_domain::{
    ConfigIssue, ConfigIssueCode, SelectionMode, Severity, Strategy, StrategySet,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One `[[ensemble.strategies]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStrategyConfig {
    pub name: String,
    pub persona: String,
}

/// Raw ensemble configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEnsembleConfig {
    pub initial_runs: usize,
    pub extra_per_round: usize,
    pub max_rounds: usize,
    pub max_workers: usize,
    pub temperature_min: f32,
    pub temperature_max: f32,
    pub max_output: u32,
    pub call_timeout_secs: u64,
    /// Strategy draw mechanism: "uniform" or "indexed"
    pub selection: String,
    pub seed: Option<u64>,
    /// Custom strategies; empty means the built-in set
    pub strategies: Vec<FileStrategyConfig>,
}

impl Default for FileEnsembleConfig {
    fn default() -> Self {
        let params = EnsembleParams::default();
        Self {
            initial_runs: params.initial_runs,
            extra_per_round: params.extra_per_round,
            max_rounds: params.max_rounds,
            max_workers: params.max_workers,
            temperature_min: params.temperature_min,
            temperature_max: params.temperature_max,
            max_output: params.max_output,
            call_timeout_secs: params.call_timeout.as_secs(),
            selection: params.selection_mode.as_str().to_string(),
            seed: None,
            strategies: Vec::new(),
        }
    }
}

impl FileEnsembleConfig {
    /// Parse the selection string, falling back to uniform with a warning.
    pub fn parse_selection_mode(&self) -> (SelectionMode, Vec<ConfigIssue>) {
        match self.selection.parse::<SelectionMode>() {
            Ok(mode) => (mode, vec![]),
            Err(_) => {
                let issue = ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::InvalidEnumValue {
                        field: "ensemble.selection".to_string(),
                        value: self.selection.clone(),
                        valid_values: vec!["uniform".to_string(), "indexed".to_string()],
                    },
                    message: format!(
                        "ensemble.selection: unknown value '{}', falling back to 'uniform'",
                        self.selection
                    ),
                };
                (SelectionMode::default(), vec![issue])
            }
        }
    }

    /// Build the strategy set. Invalid entries are reported and skipped;
    /// if none survive, the built-in set is used.
    pub fn parse_strategies(&self) -> (StrategySet, Vec<ConfigIssue>) {
        if self.strategies.is_empty() {
            return (StrategySet::builtin(), vec![]);
        }

        let mut issues = Vec::new();
        let mut strategies = Vec::new();
        for (index, entry) in self.strategies.iter().enumerate() {
            match Strategy::new(&entry.name, &entry.persona) {
                Ok(strategy) => strategies.push(strategy),
                Err(e) => issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyStrategy { index },
                    format!("ensemble.strategies[{}]: {}", index, e),
                )),
            }
        }

        match StrategySet::new(strategies) {
            Ok(set) => (set, issues),
            Err(_) => (StrategySet::builtin(), issues),
        }
    }

    /// Convert to application parameters.
    pub fn to_params(&self) -> (EnsembleParams, Vec<ConfigIssue>) {
        let (mode, issues) = self.parse_selection_mode();
        let params = EnsembleParams::default()
            .with_initial_runs(self.initial_runs)
            .with_extra_per_round(self.extra_per_round)
            .with_max_rounds(self.max_rounds)
            .with_max_workers(self.max_workers)
            .with_temperature_band(self.temperature_min, self.temperature_max)
            .with_max_output(self.max_output)
            .with_call_timeout(Duration::from_secs(self.call_timeout_secs))
            .with_selection_mode(mode)
            .with_seed(self.seed);
        (params, issues)
    }
}
