//! Console output formatter for ensemble results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use ensemble_application::{EnsembleOutcome, RunEnsembleError};
use ensemble_domain::core::string::truncate;
use ensemble_domain::{Candidate, ConsensusEvaluator, GenerationFailure};
use std::collections::BTreeMap;

/// Formats ensemble results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete ensemble outcome
    pub fn format(outcome: &EnsembleOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Ensemble Consensus"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n\n",
            "Question:".cyan().bold(),
            outcome.question
        ));

        output.push_str(&Self::ledger_section(
            &outcome.ledger,
            Some(outcome.selection.ledger_index),
        ));
        output.push_str(&Self::failure_section(&outcome.failures));

        let selection = &outcome.selection;
        output.push_str(&Self::section_header("Decision"));
        output.push_str(&format!(
            "\n{} {}\n",
            "Selected:".green().bold(),
            selection.candidate.raw.bold()
        ));
        output.push_str(&format!(
            "  support {} of {} valid candidates, {} cluster(s), {} round(s)\n",
            selection.support, selection.valid_count, selection.cluster_count, outcome.rounds_used
        ));

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(outcome: &EnsembleOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the selected answer only
    pub fn format_answer_only(outcome: &EnsembleOutcome) -> String {
        outcome.answer().to_string()
    }

    /// Format a run that ended without an answer
    pub fn format_failure(error: &RunEnsembleError) -> String {
        let mut output = format!("{} {}\n", "Error:".red().bold(), error);

        if let RunEnsembleError::RoundBudgetExceeded {
            ledger, failures, ..
        } = error
        {
            output.push_str(&Self::ledger_section(ledger, None));
            output.push_str(&Self::failure_section(failures));
        }

        output
    }

    /// Format a failure as a JSON object with a stable `error` tag
    pub fn format_failure_json(error: &RunEnsembleError) -> String {
        let value = match error {
            RunEnsembleError::ContextProduction(e) => serde_json::json!({
                "error": "context_production",
                "message": e.to_string(),
            }),
            RunEnsembleError::RoundBudgetExceeded {
                rounds,
                ledger,
                last_reason,
                failures,
            } => serde_json::json!({
                "error": "round_budget_exceeded",
                "rounds": rounds,
                "last_reason": last_reason,
                "ledger": ledger,
                "failures": failures,
            }),
            RunEnsembleError::InvalidParams(message) => serde_json::json!({
                "error": "invalid_params",
                "message": message,
            }),
        };
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Candidates grouped by round, each annotated with its cluster support
    fn ledger_section(ledger: &[Candidate], selected: Option<usize>) -> String {
        let mut output = Self::section_header("Candidates");
        if ledger.is_empty() {
            output.push_str("\n  (none)\n");
            return output;
        }

        let mut support = vec![0usize; ledger.len()];
        for cluster in ConsensusEvaluator::new().clusters(ledger) {
            for &member in cluster.members() {
                if let Some(slot) = support.get_mut(member) {
                    *slot = cluster.support();
                }
            }
        }

        let mut rounds: BTreeMap<usize, Vec<(usize, &Candidate)>> = BTreeMap::new();
        for (index, candidate) in ledger.iter().enumerate() {
            rounds.entry(candidate.round).or_default().push((index, candidate));
        }

        for (round, entries) in rounds {
            output.push_str(&format!("\n{}\n", format!("── Round {} ──", round).yellow().bold()));
            for (index, candidate) in entries {
                let strategy = candidate.strategy.as_deref().unwrap_or("-");
                let marker = if Some(index) == selected {
                    "*".green().bold().to_string()
                } else {
                    " ".to_string()
                };
                let support_label = match support[index] {
                    0 => "unusable".dimmed().to_string(),
                    n => format!("x{}", n),
                };
                output.push_str(&format!(
                    "{} [{:>3}] {:<24} {:<10} {}\n",
                    marker,
                    index,
                    truncate(&candidate.raw, 40),
                    strategy.dimmed(),
                    support_label
                ));
            }
        }

        output
    }

    fn failure_section(failures: &[GenerationFailure]) -> String {
        if failures.is_empty() {
            return String::new();
        }
        let mut output = Self::section_header("Generation Failures");
        for failure in failures {
            output.push_str(&format!("  {} {}\n", "x".red(), failure));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, outcome: &EnsembleOutcome) -> String {
        Self::format(outcome)
    }

    fn format_json(&self, outcome: &EnsembleOutcome) -> String {
        Self::format_json(outcome)
    }

    fn format_answer_only(&self, outcome: &EnsembleOutcome) -> String {
        Self::format_answer_only(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_domain::{FailureKind, InsufficientReason, RequirementSet};

    fn outcome() -> EnsembleOutcome {
        let ledger = vec![
            Candidate::new("42", 0).with_strategy("direct"),
            Candidate::new("41", 0).with_strategy("stepwise"),
            Candidate::new("42.0", 1).with_strategy("algebraic"),
        ];
        let selection = ConsensusEvaluator::new()
            .decide(&ledger, &RequirementSet::empty())
            .selection()
            .cloned()
            .unwrap();
        EnsembleOutcome {
            question: "What is 6 * 7?".to_string(),
            selection,
            rounds_used: 2,
            ledger,
            failures: vec![GenerationFailure::new(
                3,
                0,
                "direct",
                FailureKind::Timeout,
                "no response",
            )],
            started_at: chrono::Utc::now(),
            finished_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_answer_only() {
        assert_eq!(ConsoleFormatter::format_answer_only(&outcome()), "42");
    }

    #[test]
    fn test_full_format_lists_rounds_and_decision() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&outcome());
        assert!(text.contains("Question: What is 6 * 7?"));
        assert!(text.contains("── Round 0 ──"));
        assert!(text.contains("── Round 1 ──"));
        assert!(text.contains("x2"));
        assert!(text.contains("Selected: 42"));
        assert!(text.contains("timeout"));
    }

    #[test]
    fn test_json_format_round_trips_answer() {
        let json = ConsoleFormatter::format_json(&outcome());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["selection"]["candidate"]["raw"], "42");
        assert_eq!(value["rounds_used"], 2);
        assert_eq!(value["ledger"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_failure_includes_ledger() {
        colored::control::set_override(false);
        let error = RunEnsembleError::RoundBudgetExceeded {
            rounds: 6,
            ledger: vec![Candidate::new("10", 0), Candidate::new("12", 0)],
            last_reason: InsufficientReason::Scattered { clusters: 2 },
            failures: vec![],
        };
        let text = ConsoleFormatter::format_failure(&error);
        assert!(text.contains("round budget"));
        assert!(text.contains("10"));
        assert!(text.contains("12"));

        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_failure_json(&error)).unwrap();
        assert_eq!(json["error"], "round_budget_exceeded");
        assert_eq!(json["rounds"], 6);
    }

    #[test]
    fn test_invalid_params_failure() {
        colored::control::set_override(false);
        let error = RunEnsembleError::InvalidParams("bad".to_string());
        assert!(ConsoleFormatter::format_failure(&error).contains("Invalid ensemble parameters"));
    }
}
