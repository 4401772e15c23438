//! Ensemble parameters — round loop and worker pool control.
//!
//! [`EnsembleParams`] groups the static parameters that control the
//! round loop in [`RunEnsembleUseCase`](crate::use_cases::run_ensemble::RunEnsembleUseCase)
//! and the batch dispatch in [`GeneratorPool`](crate::use_cases::generator_pool::GeneratorPool).
//! These are application-layer concerns, not domain policy.

use ensemble_domain::{ConfigIssue, ConfigIssueCode, SelectionMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Round loop and generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleParams {
    /// Generations requested in round 0.
    pub initial_runs: usize,
    /// Generations requested in each extra round.
    pub extra_per_round: usize,
    /// Maximum number of extra rounds after round 0.
    pub max_rounds: usize,
    /// Upper bound on concurrent generation calls.
    pub max_workers: usize,
    /// Lower end of the per-call temperature band.
    pub temperature_min: f32,
    /// Upper end of the per-call temperature band.
    pub temperature_max: f32,
    /// Output token cap per call.
    pub max_output: u32,
    /// Deadline for a single generation call.
    pub call_timeout: Duration,
    pub selection_mode: SelectionMode,
    /// Fixed seed for reproducible strategy/temperature draws.
    pub seed: Option<u64>,
}

impl Default for EnsembleParams {
    fn default() -> Self {
        Self {
            initial_runs: 10,
            extra_per_round: 1,
            max_rounds: 5,
            max_workers: 4,
            temperature_min: 0.3,
            temperature_max: 0.5,
            max_output: 300,
            call_timeout: Duration::from_secs(60),
            selection_mode: SelectionMode::Uniform,
            seed: None,
        }
    }
}

impl EnsembleParams {
    // ==================== Builder Methods ====================

    pub fn with_initial_runs(mut self, runs: usize) -> Self {
        self.initial_runs = runs;
        self
    }

    pub fn with_extra_per_round(mut self, runs: usize) -> Self {
        self.extra_per_round = runs;
        self
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    pub fn with_temperature_band(mut self, min: f32, max: f32) -> Self {
        self.temperature_min = min;
        self.temperature_max = max;
        self
    }

    pub fn with_max_output(mut self, tokens: u32) -> Self {
        self.max_output = tokens;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    // ==================== Derived Values ====================

    /// Worker count actually used: `min(max_workers, available cores)`, never 0.
    pub fn effective_workers(&self) -> usize {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.max_workers.min(cores).max(1)
    }

    /// Total generation budget: round 0 plus every extra round.
    pub fn total_budget(&self) -> usize {
        self.initial_runs
            .saturating_add(self.max_rounds.saturating_mul(self.extra_per_round))
    }

    /// Check the parameters for values that would make a run meaningless.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.initial_runs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroValue {
                    field: "ensemble.initial_runs".to_string(),
                },
                "ensemble.initial_runs must be at least 1",
            ));
        }

        if self.max_rounds > 0 && self.extra_per_round == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroValue {
                    field: "ensemble.extra_per_round".to_string(),
                },
                "ensemble.extra_per_round must be at least 1 when max_rounds > 0",
            ));
        }

        if self.max_workers == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroValue {
                    field: "ensemble.max_workers".to_string(),
                },
                "ensemble.max_workers is 0; one worker will be used",
            ));
        }

        if !(self.temperature_min.is_finite() && self.temperature_max.is_finite())
            || self.temperature_min < 0.0
            || self.temperature_min > self.temperature_max
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvertedRange {
                    field: "ensemble.temperature".to_string(),
                },
                format!(
                    "ensemble temperature band [{}, {}] is invalid",
                    self.temperature_min, self.temperature_max
                ),
            ));
        }

        if self.max_output == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroValue {
                    field: "ensemble.max_output".to_string(),
                },
                "ensemble.max_output must be at least 1",
            ));
        }

        if self.call_timeout.is_zero() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroValue {
                    field: "ensemble.call_timeout_secs".to_string(),
                },
                "ensemble.call_timeout_secs must be at least 1",
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_domain::config::validation::has_errors;

    #[test]
    fn test_default() {
        let params = EnsembleParams::default();
        assert_eq!(params.initial_runs, 10);
        assert_eq!(params.extra_per_round, 1);
        assert_eq!(params.max_rounds, 5);
        assert_eq!(params.max_workers, 4);
        assert_eq!(params.max_output, 300);
        assert_eq!(params.call_timeout, Duration::from_secs(60));
        assert_eq!(params.selection_mode, SelectionMode::Uniform);
        assert!(params.seed.is_none());
        assert!(params.validate().is_empty());
    }

    #[test]
    fn test_builder() {
        let params = EnsembleParams::default()
            .with_initial_runs(3)
            .with_max_rounds(2)
            .with_extra_per_round(2)
            .with_seed(Some(7));

        assert_eq!(params.initial_runs, 3);
        assert_eq!(params.total_budget(), 7);
        assert_eq!(params.seed, Some(7));
    }

    #[test]
    fn test_total_budget_saturates() {
        let params = EnsembleParams::default()
            .with_initial_runs(usize::MAX)
            .with_max_rounds(usize::MAX)
            .with_extra_per_round(2);
        assert_eq!(params.total_budget(), usize::MAX);
    }

    #[test]
    fn test_effective_workers_never_zero() {
        let params = EnsembleParams::default().with_max_workers(0);
        assert_eq!(params.effective_workers(), 1);

        let params = EnsembleParams::default().with_max_workers(1);
        assert_eq!(params.effective_workers(), 1);
    }

    #[test]
    fn test_validate_rejects_zero_runs() {
        let params = EnsembleParams::default().with_initial_runs(0);
        let issues = params.validate();
        assert!(has_errors(&issues));
        assert!(issues.iter().any(|i| matches!(
            &i.code,
            ConfigIssueCode::ZeroValue { field } if field == "ensemble.initial_runs"
        )));
    }

    #[test]
    fn test_validate_rejects_inverted_temperature() {
        let params = EnsembleParams::default().with_temperature_band(0.9, 0.1);
        assert!(has_errors(&params.validate()));
    }

    #[test]
    fn test_zero_workers_is_only_a_warning() {
        let params = EnsembleParams::default().with_max_workers(0);
        let issues = params.validate();
        assert_eq!(issues.len(), 1);
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_zero_extra_allowed_without_extra_rounds() {
        let params = EnsembleParams::default()
            .with_max_rounds(0)
            .with_extra_per_round(0);
        assert!(params.validate().is_empty());
    }
}
