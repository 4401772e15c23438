//! Consensus evaluation
//!
//! [`ConsensusEvaluator`] decides, from the full candidate ledger, whether a
//! single trustworthy answer exists. It is a pure function of its inputs:
//! the same ledger and requirements always yield the same [`Decision`].
//!
//! # Stages
//!
//! ```text
//! hygiene -> hard constraints -> precision gate -> (singleton check)
//!         -> clustering -> support -> tie-break -> reliability gate
//!         -> representative
//! ```
//!
//! Each stage can short-circuit with an [`InsufficientReason`] naming it.

use super::answer::AnswerForm;
use super::candidate::Candidate;
use super::cluster::{Cluster, Tolerance, cluster_forms};
use super::requirement::RequirementSet;
use crate::context::ResearchContext;
use crate::core::question::Question;
use serde::Serialize;
use tracing::debug;

/// Why no candidate could be trusted in this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InsufficientReason {
    /// Nothing left after dropping empty and sentinel answers
    NoValidCandidates,
    /// Every valid candidate provably violates a requirement
    AllViolateRequirements,
    /// A precision requirement is active and no candidate meets it
    PrecisionUnsatisfied,
    /// Several clusters share the top support and requirements cannot pick one
    UnresolvedTie { support: usize, tied: usize },
    /// Every cluster has a single member
    Scattered { clusters: usize },
    /// The winning cluster is below the minimum support
    WeakSupport { support: usize, required: usize },
    /// The only valid candidate does not meet every requirement
    SingletonUnsatisfied,
    /// No member of the winning cluster meets every requirement
    RepresentativeUnsatisfied,
}

impl InsufficientReason {
    pub fn describe(&self) -> String {
        match self {
            InsufficientReason::NoValidCandidates => "no valid candidates".to_string(),
            InsufficientReason::AllViolateRequirements => {
                "all candidates violate a requirement".to_string()
            }
            InsufficientReason::PrecisionUnsatisfied => {
                "no candidate meets the required precision".to_string()
            }
            InsufficientReason::UnresolvedTie { support, tied } => {
                format!("{} clusters tied at support {}", tied, support)
            }
            InsufficientReason::Scattered { clusters } => {
                format!("answers scattered across {} clusters", clusters)
            }
            InsufficientReason::WeakSupport { support, required } => {
                format!("winning support {} below required {}", support, required)
            }
            InsufficientReason::SingletonUnsatisfied => {
                "single candidate does not meet the requirements".to_string()
            }
            InsufficientReason::RepresentativeUnsatisfied => {
                "winning cluster has no member meeting the requirements".to_string()
            }
        }
    }
}

impl std::fmt::Display for InsufficientReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// The trusted answer and the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub candidate: Candidate,
    /// Position of the representative in the ledger
    pub ledger_index: usize,
    /// Members in the winning cluster
    pub support: usize,
    /// Distinct clusters among valid candidates
    pub cluster_count: usize,
    /// Candidates that survived hygiene and hard constraints
    pub valid_count: usize,
}

/// Terminal output of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", content = "detail", rename_all = "snake_case")]
pub enum Decision {
    Selected(Selection),
    InsufficientConsensus(InsufficientReason),
}

impl Decision {
    pub fn is_selected(&self) -> bool {
        matches!(self, Decision::Selected(_))
    }

    pub fn selection(&self) -> Option<&Selection> {
        match self {
            Decision::Selected(s) => Some(s),
            Decision::InsufficientConsensus(_) => None,
        }
    }

    pub fn reason(&self) -> Option<InsufficientReason> {
        match self {
            Decision::Selected(_) => None,
            Decision::InsufficientConsensus(r) => Some(*r),
        }
    }
}

/// Policy deciding whether the ledger holds a trustworthy answer.
///
/// Implementations must be deterministic.
pub trait ConsensusPolicy: Send + Sync {
    fn evaluate(
        &self,
        question: &Question,
        context: &ResearchContext,
        candidates: &[Candidate],
        requirements: &RequirementSet,
    ) -> Decision;
}

/// A candidate that passed hygiene, with its normalized form.
struct Entry<'a> {
    index: usize,
    candidate: &'a Candidate,
    form: AnswerForm,
}

/// Deterministic clustering-and-gating consensus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsensusEvaluator {
    tolerance: Tolerance,
    min_support: usize,
}

impl Default for ConsensusEvaluator {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            min_support: 2,
        }
    }
}

impl ConsensusEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Minimum winning support when more than one cluster exists (at least 2).
    pub fn with_min_support(mut self, min_support: usize) -> Self {
        self.min_support = min_support.max(2);
        self
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Clusters over every usable candidate, ignoring requirements.
    ///
    /// Used for reporting; [`decide`](Self::decide) recomputes its own.
    pub fn clusters(&self, candidates: &[Candidate]) -> Vec<Cluster> {
        let forms: Vec<(usize, AnswerForm)> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (i, AnswerForm::parse(&c.raw)))
            .filter(|(_, f)| f.is_usable())
            .collect();
        cluster_forms(forms.iter().map(|(i, f)| (*i, f)), &self.tolerance)
    }

    /// Run every stage over the ledger snapshot.
    pub fn decide(&self, candidates: &[Candidate], requirements: &RequirementSet) -> Decision {
        use InsufficientReason::*;

        // Hygiene
        let valid: Vec<Entry<'_>> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| Entry {
                index,
                candidate,
                form: AnswerForm::parse(&candidate.raw),
            })
            .filter(|e| e.form.is_usable())
            .collect();
        debug!(
            "Hygiene kept {} of {} candidates",
            valid.len(),
            candidates.len()
        );
        if valid.is_empty() {
            return Decision::InsufficientConsensus(NoValidCandidates);
        }

        // Hard constraints
        let survivors: Vec<Entry<'_>> = valid
            .into_iter()
            .filter(|e| !requirements.is_violated_by(&e.form))
            .collect();
        debug!("{} candidates survive hard constraints", survivors.len());
        if survivors.is_empty() {
            return Decision::InsufficientConsensus(AllViolateRequirements);
        }

        // Precision gate
        if let Some(precision) = requirements.precision()
            && !survivors.iter().any(|e| precision.is_satisfied_by(&e.form))
        {
            debug!("No candidate meets {}", precision);
            return Decision::InsufficientConsensus(PrecisionUnsatisfied);
        }

        // Singleton
        if let [only] = survivors.as_slice() {
            if !requirements.is_satisfied_by(&only.form) {
                debug!("Lone candidate {:?} misses a requirement", only.candidate.raw);
                return Decision::InsufficientConsensus(SingletonUnsatisfied);
            }
            return Decision::Selected(Selection {
                candidate: only.candidate.clone(),
                ledger_index: only.index,
                support: 1,
                cluster_count: 1,
                valid_count: 1,
            });
        }

        // Clustering
        let clusters = cluster_forms(survivors.iter().map(|e| (e.index, &e.form)), &self.tolerance);
        let form_of = |index: usize| {
            survivors
                .iter()
                .find(|e| e.index == index)
                .map(|e| &e.form)
        };
        let satisfies = |index: usize| form_of(index).is_some_and(|f| requirements.is_satisfied_by(f));

        debug!("{} clusters over {} candidates", clusters.len(), survivors.len());

        // Support
        let max_support = clusters.iter().map(Cluster::support).max().unwrap_or(0);
        let tied: Vec<&Cluster> = clusters
            .iter()
            .filter(|c| c.support() == max_support)
            .collect();

        // Tie-break
        let winner = match tied.as_slice() {
            [single] => *single,
            _ => {
                let compliant: Vec<&&Cluster> = if requirements.is_empty() {
                    Vec::new()
                } else {
                    tied.iter()
                        .filter(|c| c.members().iter().any(|&m| satisfies(m)))
                        .collect()
                };
                match compliant.as_slice() {
                    [single] => **single,
                    _ => {
                        debug!("{} clusters tie at support {}", tied.len(), max_support);
                        return Decision::InsufficientConsensus(UnresolvedTie {
                            support: max_support,
                            tied: tied.len(),
                        });
                    }
                }
            }
        };

        // Reliability gate
        if clusters.len() > 1 {
            if max_support < 2 {
                debug!("All {} clusters are singletons", clusters.len());
                return Decision::InsufficientConsensus(Scattered {
                    clusters: clusters.len(),
                });
            }
            if winner.support() < self.min_support {
                debug!(
                    "Winning support {} below minimum {}",
                    winner.support(),
                    self.min_support
                );
                return Decision::InsufficientConsensus(WeakSupport {
                    support: winner.support(),
                    required: self.min_support,
                });
            }
        }

        // Representative: earliest member meeting every requirement
        let Some(index) = winner.members().iter().copied().find(|&m| satisfies(m)) else {
            debug!("No member of the winning cluster meets every requirement");
            return Decision::InsufficientConsensus(RepresentativeUnsatisfied);
        };

        debug!(
            "Selected ledger[{}] {:?} with support {}",
            index,
            candidates[index].raw,
            winner.support()
        );
        Decision::Selected(Selection {
            candidate: candidates[index].clone(),
            ledger_index: index,
            support: winner.support(),
            cluster_count: clusters.len(),
            valid_count: survivors.len(),
        })
    }
}

impl ConsensusPolicy for ConsensusEvaluator {
    fn evaluate(
        &self,
        _question: &Question,
        _context: &ResearchContext,
        candidates: &[Candidate],
        requirements: &RequirementSet,
    ) -> Decision {
        self.decide(candidates, requirements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::requirement::{FormatClass, Requirement};

    fn ledger(raws: &[&str]) -> Vec<Candidate> {
        raws.iter().map(|r| Candidate::new(*r, 0)).collect()
    }

    fn decide(raws: &[&str], requirements: &RequirementSet) -> Decision {
        ConsensusEvaluator::default().decide(&ledger(raws), requirements)
    }

    fn selected_raw(decision: &Decision) -> &str {
        &decision.selection().expect("expected a selection").candidate.raw
    }

    #[test]
    fn test_tolerance_equivalence_selects_earliest() {
        let decision = decide(&["42", "42.0", "41.9999999"], &RequirementSet::empty());
        assert_eq!(selected_raw(&decision), "42");
        let selection = decision.selection().unwrap();
        assert_eq!(selection.support, 3);
        assert_eq!(selection.ledger_index, 0);
    }

    #[test]
    fn test_precision_gate() {
        let reqs = RequirementSet::empty().with(Requirement::precision(5));

        let decision = decide(&["3.14", "3.14159", "pi"], &reqs);
        assert_eq!(selected_raw(&decision), "3.14159");

        let decision = decide(&["3.14", "pi"], &reqs);
        assert_eq!(
            decision,
            Decision::InsufficientConsensus(InsufficientReason::PrecisionUnsatisfied)
        );
    }

    #[test]
    fn test_scatter_gate() {
        let decision = decide(&["10", "12", "9.5", "11"], &RequirementSet::empty());
        assert!(!decision.is_selected());
    }

    #[test]
    fn test_scattered_after_tie_break() {
        // Three singletons tie; the fraction format picks the only fraction,
        // which still fails the reliability gate.
        let reqs = RequirementSet::empty().with(Requirement::format(FormatClass::Fraction));
        let decision = decide(&["10", "24/2", "9.5"], &reqs);
        assert_eq!(
            decision,
            Decision::InsufficientConsensus(InsufficientReason::Scattered { clusters: 3 })
        );
    }

    #[test]
    fn test_grouped_thousands_do_not_borrow_support() {
        let decision = decide(&["1,000", "1000", "1.0"], &RequirementSet::empty());
        assert!(!decision.is_selected());

        let decision = decide(&["1,000", "1"], &RequirementSet::empty());
        assert!(!decision.is_selected());

        let decision = decide(&["1,000", "1000", "1000.0"], &RequirementSet::empty());
        assert_eq!(selected_raw(&decision), "1000");
        assert_eq!(decision.selection().unwrap().support, 2);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn decide_logged(raws: &[&str], requirements: &RequirementSet) -> (Decision, String) {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let decision = tracing::subscriber::with_default(subscriber, || decide(raws, requirements));
        let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        (decision, text)
    }

    #[test]
    fn test_stages_emit_debug_events() {
        let (decision, log) = decide_logged(&["7", "7", "8"], &RequirementSet::empty());
        assert!(decision.is_selected());
        assert!(log.contains("Hygiene kept 3 of 3 candidates"));
        assert!(log.contains("2 clusters over 3 candidates"));
        assert!(log.contains("Selected ledger[0]"));

        let (decision, log) = decide_logged(&["10", "12", "9.5"], &RequirementSet::empty());
        assert!(!decision.is_selected());
        assert!(log.contains("3 clusters tie at support 1"));
    }

    #[test]
    fn test_hygiene_filter() {
        let decision = decide(&["", "  ", "null", "NaN"], &RequirementSet::empty());
        assert_eq!(
            decision,
            Decision::InsufficientConsensus(InsufficientReason::NoValidCandidates)
        );

        // Sentinels never count as support
        let decision = decide(&["null", "7", "null", "7"], &RequirementSet::empty());
        assert_eq!(selected_raw(&decision), "7");
        assert_eq!(decision.selection().unwrap().ledger_index, 1);
    }

    #[test]
    fn test_all_violate_requirements() {
        let reqs = RequirementSet::empty().with(Requirement::domain(Some(0.0), None).unwrap());
        let decision = decide(&["-1", "-2"], &reqs);
        assert_eq!(
            decision,
            Decision::InsufficientConsensus(InsufficientReason::AllViolateRequirements)
        );
    }

    #[test]
    fn test_hard_constraint_removes_majority() {
        // Three agree on a negative value outside the domain; the two in-range
        // answers win instead.
        let reqs = RequirementSet::empty().with(Requirement::domain(Some(0.0), None).unwrap());
        let decision = decide(&["-3", "3", "-3", "3.0", "-3"], &reqs);
        assert_eq!(selected_raw(&decision), "3");
        assert_eq!(decision.selection().unwrap().valid_count, 2);
    }

    #[test]
    fn test_unresolved_tie() {
        let decision = decide(&["1", "2", "1", "2"], &RequirementSet::empty());
        assert_eq!(
            decision,
            Decision::InsufficientConsensus(InsufficientReason::UnresolvedTie {
                support: 2,
                tied: 2
            })
        );
    }

    #[test]
    fn test_tie_broken_by_requirement() {
        let reqs = RequirementSet::empty().with(Requirement::precision(3));
        let decision = decide(&["0.5", "0.125", "1/2", "1/8"], &reqs);
        assert_eq!(selected_raw(&decision), "0.125");
        assert_eq!(decision.selection().unwrap().support, 2);
    }

    #[test]
    fn test_tie_not_broken_when_both_comply() {
        let reqs = RequirementSet::empty().with(Requirement::format(FormatClass::Decimal));
        let decision = decide(&["0.5", "0.25", "0.50", "0.250"], &reqs);
        assert!(matches!(
            decision,
            Decision::InsufficientConsensus(InsufficientReason::UnresolvedTie { .. })
        ));
    }

    #[test]
    fn test_singleton_case() {
        let decision = decide(&["7", "", "null"], &RequirementSet::empty());
        assert_eq!(selected_raw(&decision), "7");

        let reqs = RequirementSet::empty().with(Requirement::format(FormatClass::Fraction));
        let decision = decide(&["7"], &reqs);
        assert_eq!(
            decision,
            Decision::InsufficientConsensus(InsufficientReason::SingletonUnsatisfied)
        );
    }

    #[test]
    fn test_single_cluster_needs_no_gate() {
        let decision = decide(&["x = 4", "X = 4"], &RequirementSet::empty());
        assert_eq!(selected_raw(&decision), "x = 4");
    }

    #[test]
    fn test_majority_with_outlier() {
        let decision = decide(&["12", "12", "13"], &RequirementSet::empty());
        let selection = decision.selection().unwrap();
        assert_eq!(selection.support, 2);
        assert_eq!(selection.cluster_count, 2);
    }

    #[test]
    fn test_weak_support_with_higher_threshold() {
        let evaluator = ConsensusEvaluator::default().with_min_support(3);
        let decision = evaluator.decide(&ledger(&["12", "12", "13"]), &RequirementSet::empty());
        assert_eq!(
            decision,
            Decision::InsufficientConsensus(InsufficientReason::WeakSupport {
                support: 2,
                required: 3
            })
        );
    }

    #[test]
    fn test_representative_skips_non_compliant_member() {
        let reqs = RequirementSet::empty().with(Requirement::precision(5));
        let decision = decide(&["pi", "3.14159", "3"], &reqs);
        assert_eq!(selected_raw(&decision), "3.14159");
        assert_eq!(decision.selection().unwrap().ledger_index, 1);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let candidates = ledger(&["1/3", "0.3333333", "0.33", "x", "0.333333333"]);
        let reqs = RequirementSet::empty();
        let evaluator = ConsensusEvaluator::default();
        let question = Question::try_new("1 divided by 3").unwrap();
        let context = ResearchContext::empty();
        let first = evaluator.evaluate(&question, &context, &candidates, &reqs);
        let second = evaluator.evaluate(&question, &context, &candidates, &reqs);
        assert_eq!(first, second);
        assert_eq!(selected_raw(&first), "1/3");
    }

    #[test]
    fn test_report_clusters() {
        let clusters = ConsensusEvaluator::default().clusters(&ledger(&["2", "null", "2.0", "3"]));
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members(), &[0, 2]);
    }
}
