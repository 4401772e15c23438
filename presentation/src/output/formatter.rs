//! Output formatter trait

use ensemble_application::EnsembleOutcome;

/// Trait for formatting ensemble results
pub trait OutputFormatter {
    /// Format the complete run: rounds, clusters and decision
    fn format(&self, outcome: &EnsembleOutcome) -> String;

    /// Format as JSON
    fn format_json(&self, outcome: &EnsembleOutcome) -> String;

    /// Format the selected answer only (concise output)
    fn format_answer_only(&self, outcome: &EnsembleOutcome) -> String;
}
