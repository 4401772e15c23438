//! Candidate answers and generation failures
//!
//! One generation call yields exactly one [`GenerationOutcome`]: either a
//! [`Candidate`] for the ledger or a [`GenerationFailure`] that is counted
//! and reported but never aborts a round.

use serde::{Deserialize, Serialize};

/// One raw answer produced by a single generation call (immutable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Answer text exactly as extracted from the backend output
    pub raw: String,
    /// Round that produced this candidate (0 = initial batch)
    pub round: usize,
    /// Strategy tag the generator ran under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

impl Candidate {
    pub fn new(raw: impl Into<String>, round: usize) -> Self {
        Self {
            raw: raw.into(),
            round,
            strategy: None,
        }
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }
}

/// Why a generation call produced no candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Backend returned an error (connection, HTTP status, worker crash)
    Backend,
    /// The per-call deadline elapsed
    Timeout,
    /// Output could not be read as a single final answer
    Malformed,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Backend => "backend",
            FailureKind::Timeout => "timeout",
            FailureKind::Malformed => "malformed",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded, non-fatal generation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationFailure {
    /// Worker slot index within the batch
    pub slot: usize,
    pub round: usize,
    pub strategy: String,
    pub kind: FailureKind,
    pub message: String,
}

impl GenerationFailure {
    pub fn new(
        slot: usize,
        round: usize,
        strategy: impl Into<String>,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            slot,
            round,
            strategy: strategy.into(),
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "round {} slot {} ({}): {} - {}",
            self.round, self.slot, self.strategy, self.kind, self.message
        )
    }
}

/// Result of one slot in a generation batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated(Candidate),
    Failed(GenerationFailure),
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Generated(_))
    }

    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            GenerationOutcome::Generated(c) => Some(c),
            GenerationOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&GenerationFailure> {
        match self {
            GenerationOutcome::Generated(_) => None,
            GenerationOutcome::Failed(f) => Some(f),
        }
    }
}

/// Split a batch into its candidates and failures, preserving slot order.
pub fn partition_outcomes(
    outcomes: Vec<GenerationOutcome>,
) -> (Vec<Candidate>, Vec<GenerationFailure>) {
    let mut candidates = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            GenerationOutcome::Generated(c) => candidates.push(c),
            GenerationOutcome::Failed(f) => failures.push(f),
        }
    }
    (candidates, failures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_builder() {
        let c = Candidate::new("42", 0).with_strategy("direct");
        assert_eq!(c.raw, "42");
        assert_eq!(c.round, 0);
        assert_eq!(c.strategy.as_deref(), Some("direct"));
    }

    #[test]
    fn test_partition_preserves_order() {
        let outcomes = vec![
            GenerationOutcome::Generated(Candidate::new("a", 1)),
            GenerationOutcome::Failed(GenerationFailure::new(
                1,
                1,
                "direct",
                FailureKind::Timeout,
                "deadline elapsed",
            )),
            GenerationOutcome::Generated(Candidate::new("b", 1)),
        ];
        let (candidates, failures) = partition_outcomes(outcomes);
        assert_eq!(
            candidates.iter().map(|c| c.raw.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].slot, 1);
        assert_eq!(failures[0].kind, FailureKind::Timeout);
    }

    #[test]
    fn test_failure_display() {
        let f = GenerationFailure::new(3, 2, "stepwise", FailureKind::Malformed, "no JSON");
        assert_eq!(f.to_string(), "round 2 slot 3 (stepwise): malformed - no JSON");
    }
}
