//! Run Ensemble use case
//!
//! The round orchestrator: produces research context once, then drives the
//! generate → evaluate loop over an ever-growing candidate ledger until the
//! consensus policy selects an answer or the round budget runs out.

use crate::config::EnsembleParams;
use crate::ports::context_provider::{ContextError, ContextProvider, NoResearch};
use crate::ports::generation_backend::GenerationBackend;
use crate::ports::progress::{NoProgress, RoundProgressNotifier};
use crate::ports::run_logger::{NoRunLogger, RunEvent, RunLogger};
use crate::use_cases::generator_pool::GeneratorPool;
use chrono::{DateTime, Utc};
use ensemble_domain::config::validation::has_errors;
use ensemble_domain::{
    Candidate, CandidateLedger, ConsensusEvaluator, ConsensusPolicy, Decision, GenerationFailure,
    InsufficientReason, Question, RequirementSet, ResearchContext, Selection, StrategySet,
    partition_outcomes,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that end an ensemble run without a selected answer
#[derive(Error, Debug)]
pub enum RunEnsembleError {
    #[error("Context production failed: {0}")]
    ContextProduction(#[from] ContextError),

    #[error("Consensus not reached within round budget ({rounds} rounds): {last_reason}")]
    RoundBudgetExceeded {
        rounds: usize,
        /// Every candidate produced during the run, in insertion order
        ledger: Vec<Candidate>,
        last_reason: InsufficientReason,
        failures: Vec<GenerationFailure>,
    },

    #[error("Invalid ensemble parameters: {0}")]
    InvalidParams(String),
}

impl RunEnsembleError {
    /// True when the run finished normally but no answer could be trusted.
    pub fn is_no_consensus(&self) -> bool {
        matches!(self, RunEnsembleError::RoundBudgetExceeded { .. })
    }
}

/// Orchestrator state, traced on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Generating,
    Evaluating,
    Done,
}

/// Input for the RunEnsemble use case
#[derive(Debug, Clone)]
pub struct RunEnsembleInput {
    pub question: Question,
    pub requirements: RequirementSet,
}

impl RunEnsembleInput {
    pub fn new(question: impl Into<Question>) -> Self {
        Self {
            question: question.into(),
            requirements: RequirementSet::empty(),
        }
    }

    pub fn with_requirements(mut self, requirements: RequirementSet) -> Self {
        self.requirements = requirements;
        self
    }
}

/// Successful run result.
#[derive(Debug, Clone, Serialize)]
pub struct EnsembleOutcome {
    pub question: String,
    pub selection: Selection,
    /// Rounds executed, round 0 included
    pub rounds_used: usize,
    pub ledger: Vec<Candidate>,
    pub failures: Vec<GenerationFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl EnsembleOutcome {
    pub fn answer(&self) -> &str {
        &self.selection.candidate.raw
    }
}

/// Use case for running an ensemble consensus
pub struct RunEnsembleUseCase<B: GenerationBackend + 'static> {
    pool: GeneratorPool<B>,
    context_provider: Arc<dyn ContextProvider>,
    policy: Arc<dyn ConsensusPolicy>,
    logger: Arc<dyn RunLogger>,
    params: EnsembleParams,
}

impl<B: GenerationBackend + 'static> RunEnsembleUseCase<B> {
    pub fn new(backend: Arc<B>, strategies: StrategySet, params: EnsembleParams) -> Self {
        Self {
            pool: GeneratorPool::new(backend, strategies, &params),
            context_provider: Arc::new(NoResearch),
            policy: Arc::new(ConsensusEvaluator::new()),
            logger: Arc::new(NoRunLogger),
            params,
        }
    }

    pub fn with_context_provider(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        self.context_provider = provider;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn ConsensusPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn RunLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn params(&self) -> &EnsembleParams {
        &self.params
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunEnsembleInput,
    ) -> Result<EnsembleOutcome, RunEnsembleError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunEnsembleInput,
        progress: &dyn RoundProgressNotifier,
    ) -> Result<EnsembleOutcome, RunEnsembleError> {
        let issues = self.params.validate();
        if has_errors(&issues) {
            let messages: Vec<String> = issues.into_iter().map(|i| i.message).collect();
            return Err(RunEnsembleError::InvalidParams(messages.join("; ")));
        }

        let started_at = Utc::now();
        info!(
            "Starting ensemble: {} initial runs, up to {} extra rounds of {} ({} generations at most)",
            self.params.initial_runs,
            self.params.max_rounds,
            self.params.extra_per_round,
            self.params.total_budget()
        );

        let context = self.produce_context(&input.question).await?;

        let ledger = CandidateLedger::new();
        let mut failures: Vec<GenerationFailure> = Vec::new();
        let mut round = 0;
        let mut requested = self.params.initial_runs;

        loop {
            debug!("Round {}: {:?}", round, RoundState::Generating);
            progress.on_round_start(round, requested);

            let before = ledger.len();
            let outcomes = self
                .pool
                .generate_batch_with_progress(round, requested, &input.question, &context, progress)
                .await;
            let (candidates, batch_failures) = partition_outcomes(outcomes);

            for candidate in &candidates {
                self.logger.log(RunEvent::new(
                    "candidate",
                    serde_json::json!({
                        "round": round,
                        "strategy": candidate.strategy,
                        "raw": candidate.raw,
                    }),
                ));
            }
            for failure in &batch_failures {
                self.logger.log(RunEvent::new(
                    "generation_failed",
                    serde_json::to_value(failure).unwrap_or_default(),
                ));
            }

            let after = ledger.append(candidates);
            info!(
                "Round {}: {} new candidates, {} failures, ledger size {}",
                round,
                after - before,
                batch_failures.len(),
                after
            );
            failures.extend(batch_failures);

            debug!("Round {}: {:?}", round, RoundState::Evaluating);
            let snapshot = ledger.snapshot();
            let decision =
                self.policy
                    .evaluate(&input.question, &context, &snapshot, &input.requirements);

            self.logger.log(RunEvent::new(
                "evaluation",
                serde_json::json!({
                    "round": round,
                    "ledger_size": snapshot.len(),
                    "decision": decision,
                }),
            ));
            progress.on_round_complete(round, &decision);

            match decision {
                Decision::Selected(selection) => {
                    debug!("Round {}: {:?}", round, RoundState::Done);
                    info!(
                        "Consensus reached in round {}: {} (support {})",
                        round, selection.candidate.raw, selection.support
                    );
                    self.log_finished(true, round + 1, snapshot.len());
                    return Ok(EnsembleOutcome {
                        question: input.question.content().to_string(),
                        selection,
                        rounds_used: round + 1,
                        ledger: snapshot,
                        failures,
                        started_at,
                        finished_at: Utc::now(),
                    });
                }
                Decision::InsufficientConsensus(reason) => {
                    if round >= self.params.max_rounds {
                        debug!("Round {}: {:?}", round, RoundState::Done);
                        warn!(
                            "Round budget exhausted after {} rounds: {}",
                            round + 1,
                            reason
                        );
                        self.log_finished(false, round + 1, snapshot.len());
                        return Err(RunEnsembleError::RoundBudgetExceeded {
                            rounds: round + 1,
                            ledger: snapshot,
                            last_reason: reason,
                            failures,
                        });
                    }
                    info!("Round {}: insufficient consensus ({})", round, reason);
                    round += 1;
                    requested = self.params.extra_per_round;
                }
            }
        }
    }

    /// Produce the research context exactly once; failures end the run.
    async fn produce_context(
        &self,
        question: &Question,
    ) -> Result<ResearchContext, RunEnsembleError> {
        let context = self.context_provider.produce(question).await.map_err(|e| {
            warn!("Context production failed: {}", e);
            RunEnsembleError::ContextProduction(e)
        })?;

        if !context.is_empty() {
            info!("Research context produced: {}", context.topic);
        }
        self.logger.log(RunEvent::new(
            "context_produced",
            serde_json::to_value(&context).unwrap_or_default(),
        ));
        Ok(context)
    }

    fn log_finished(&self, selected: bool, rounds: usize, ledger_size: usize) {
        self.logger.log(RunEvent::new(
            "run_finished",
            serde_json::json!({
                "selected": selected,
                "rounds": rounds,
                "ledger_size": ledger_size,
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::generation_backend::{BackendError, GenerationRequest};
    use async_trait::async_trait;
    use ensemble_domain::Requirement;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that pops scripted answers in call order; an empty queue
    /// repeats the fallback.
    struct MockBackend {
        responses: Mutex<VecDeque<Result<String, String>>>,
        fallback: String,
        calls: AtomicUsize,
    }

    impl MockBackend {
        fn new(answers: &[&str], fallback: &str) -> Self {
            Self {
                responses: Mutex::new(answers.iter().map(|a| Ok(wrap(a))).collect()),
                fallback: wrap(fallback),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_failures(script: Vec<Result<&str, &str>>, fallback: &str) -> Self {
            Self {
                responses: Mutex::new(
                    script
                        .into_iter()
                        .map(|r| r.map(wrap).map_err(String::from))
                        .collect(),
                ),
                fallback: wrap(fallback),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn wrap(answer: &str) -> String {
        format!(r#"{{"final_answer": "{}"}}"#, answer)
    }

    #[async_trait]
    impl GenerationBackend for MockBackend {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(Ok(text)) => Ok(text),
                Some(Err(msg)) => Err(BackendError::RequestFailed(msg)),
                None => Ok(self.fallback.clone()),
            }
        }
    }

    struct NeverAgree {
        evaluations: AtomicUsize,
        ledger_sizes: Mutex<Vec<usize>>,
    }

    impl NeverAgree {
        fn new() -> Self {
            Self {
                evaluations: AtomicUsize::new(0),
                ledger_sizes: Mutex::new(Vec::new()),
            }
        }
    }

    impl ConsensusPolicy for NeverAgree {
        fn evaluate(
            &self,
            _question: &Question,
            _context: &ResearchContext,
            candidates: &[Candidate],
            _requirements: &RequirementSet,
        ) -> Decision {
            self.evaluations.fetch_add(1, Ordering::SeqCst);
            self.ledger_sizes.lock().unwrap().push(candidates.len());
            Decision::InsufficientConsensus(InsufficientReason::NoValidCandidates)
        }
    }

    struct FailingResearch;

    #[async_trait]
    impl ContextProvider for FailingResearch {
        async fn produce(&self, _question: &Question) -> Result<ResearchContext, ContextError> {
            Err(ContextError::Malformed("not json".to_string()))
        }
    }

    struct CountingResearch {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContextProvider for CountingResearch {
        async fn produce(&self, _question: &Question) -> Result<ResearchContext, ContextError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ResearchContext {
                topic: "arithmetic".to_string(),
                summary: "multiplication".to_string(),
                sources: vec![],
                tools_used: vec![],
            })
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl RunLogger for RecordingLogger {
        fn log(&self, event: RunEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    fn params() -> EnsembleParams {
        EnsembleParams::default()
            .with_initial_runs(4)
            .with_max_rounds(3)
            .with_extra_per_round(1)
            .with_max_workers(1)
            .with_seed(Some(5))
    }

    fn input() -> RunEnsembleInput {
        RunEnsembleInput::new(Question::try_new("What is 6 * 7?").unwrap())
    }

    #[tokio::test]
    async fn test_selects_in_round_zero() {
        let backend = Arc::new(MockBackend::new(&["42", "42.0", "41.9999999", "40"], "0"));
        let use_case = RunEnsembleUseCase::new(backend.clone(), StrategySet::builtin(), params());

        let outcome = use_case.execute(input()).await.unwrap();

        assert_eq!(outcome.answer(), "42");
        assert_eq!(outcome.selection.support, 3);
        assert_eq!(outcome.rounds_used, 1);
        assert_eq!(outcome.ledger.len(), 4);
        assert_eq!(backend.calls(), 4);
    }

    #[tokio::test]
    async fn test_extra_round_recomputes_over_full_ledger() {
        // Round 0 is fully scattered; the extra candidate agrees with the first.
        let backend = Arc::new(MockBackend::new(&["10", "12", "9.5", "11"], "10.0"));
        let use_case = RunEnsembleUseCase::new(backend.clone(), StrategySet::builtin(), params());

        let outcome = use_case.execute(input()).await.unwrap();

        assert_eq!(outcome.answer(), "10");
        assert_eq!(outcome.selection.ledger_index, 0);
        assert_eq!(outcome.rounds_used, 2);
        assert_eq!(outcome.ledger.len(), 5);
        assert_eq!(outcome.ledger[4].round, 1);
    }

    #[tokio::test]
    async fn test_round_budget_is_exact() {
        let backend = Arc::new(MockBackend::new(&[], "1"));
        let policy = Arc::new(NeverAgree::new());
        let use_case = RunEnsembleUseCase::new(backend.clone(), StrategySet::builtin(), params())
            .with_policy(policy.clone());

        let err = use_case.execute(input()).await.unwrap_err();
        assert!(err.is_no_consensus());

        match err {
            RunEnsembleError::RoundBudgetExceeded { rounds, ledger, .. } => {
                assert_eq!(rounds, 4);
                assert_eq!(ledger.len(), 7);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Round 0 plus exactly max_rounds extra rounds.
        assert_eq!(policy.evaluations.load(Ordering::SeqCst), 4);
        assert_eq!(backend.calls(), 7);
    }

    #[tokio::test]
    async fn test_ledger_grows_monotonically() {
        let backend = Arc::new(MockBackend::with_failures(
            vec![Ok("1"), Err("down"), Ok("2"), Err("down"), Err("down")],
            "3",
        ));
        let policy = Arc::new(NeverAgree::new());
        let use_case = RunEnsembleUseCase::new(backend, StrategySet::builtin(), params())
            .with_policy(policy.clone());

        let _ = use_case.execute(input()).await;

        let sizes = policy.ledger_sizes.lock().unwrap().clone();
        assert_eq!(sizes.len(), 4);
        assert!(sizes.windows(2).all(|w| w[1] >= w[0]));
        // Round 1's only call failed, so the ledger did not change.
        assert_eq!(sizes[0], sizes[1]);
    }

    #[tokio::test]
    async fn test_partial_batch_still_evaluated() {
        let backend = Arc::new(MockBackend::with_failures(
            vec![Ok("7"), Err("down"), Ok("7"), Err("down")],
            "8",
        ));
        let use_case = RunEnsembleUseCase::new(backend, StrategySet::builtin(), params());

        let outcome = use_case.execute(input()).await.unwrap();

        assert_eq!(outcome.answer(), "7");
        assert_eq!(outcome.ledger.len(), 2);
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(outcome.rounds_used, 1);
    }

    #[tokio::test]
    async fn test_context_failure_is_fatal() {
        let backend = Arc::new(MockBackend::new(&[], "1"));
        let use_case = RunEnsembleUseCase::new(backend.clone(), StrategySet::builtin(), params())
            .with_context_provider(Arc::new(FailingResearch));

        let err = use_case.execute(input()).await.unwrap_err();

        assert!(matches!(err, RunEnsembleError::ContextProduction(_)));
        assert!(!err.is_no_consensus());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_context_produced_once() {
        let backend = Arc::new(MockBackend::new(&["1", "2", "3", "4"], "5"));
        let research = Arc::new(CountingResearch {
            calls: AtomicUsize::new(0),
        });
        let use_case = RunEnsembleUseCase::new(backend, StrategySet::builtin(), params())
            .with_context_provider(research.clone());

        let _ = use_case.execute(input()).await;

        assert_eq!(research.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_params_rejected_before_generation() {
        let backend = Arc::new(MockBackend::new(&[], "1"));
        let use_case = RunEnsembleUseCase::new(
            backend.clone(),
            StrategySet::builtin(),
            params().with_initial_runs(0),
        );

        let err = use_case.execute(input()).await.unwrap_err();

        assert!(matches!(err, RunEnsembleError::InvalidParams(_)));
        assert!(!err.is_no_consensus());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_requirements_reach_the_evaluator() {
        let backend = Arc::new(MockBackend::new(&["3.14", "3.14159", "pi"], "3.14"));
        let use_case = RunEnsembleUseCase::new(
            backend,
            StrategySet::builtin(),
            params().with_initial_runs(3),
        );
        let input = input().with_requirements(RequirementSet::empty().with(Requirement::precision(5)));

        let outcome = use_case.execute(input).await.unwrap();

        assert_eq!(outcome.answer(), "3.14159");
    }

    #[tokio::test]
    async fn test_transcript_events_in_order() {
        let backend = Arc::new(MockBackend::with_failures(
            vec![Ok("5"), Ok("5"), Err("down"), Ok("5")],
            "5",
        ));
        let logger = Arc::new(RecordingLogger::default());
        let use_case = RunEnsembleUseCase::new(backend, StrategySet::builtin(), params())
            .with_logger(logger.clone());

        use_case.execute(input()).await.unwrap();

        let events = logger.events.lock().unwrap().clone();
        assert_eq!(events.first(), Some(&"context_produced"));
        assert_eq!(events.last(), Some(&"run_finished"));
        assert_eq!(events.iter().filter(|e| **e == "candidate").count(), 3);
        assert_eq!(events.iter().filter(|e| **e == "generation_failed").count(), 1);
        assert_eq!(events.iter().filter(|e| **e == "evaluation").count(), 1);
    }
}
