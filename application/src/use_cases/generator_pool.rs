//! Generator pool
//!
//! Fans one round's generation requests out to the backend under a bounded
//! worker count, then gathers the outcomes back into slot order. Individual
//! call failures are absorbed here and reported as [`GenerationFailure`]s.

use crate::config::EnsembleParams;
use crate::ports::generation_backend::{BackendError, GenerationBackend, GenerationRequest};
use crate::ports::progress::{NoProgress, RoundProgressNotifier};
use crate::use_cases::strategy_selector::{SlotDraw, StrategySelector};
use ensemble_domain::{
    Candidate, FailureKind, GenerationFailure, GenerationOutcome, PromptTemplate, Question,
    ResearchContext, StrategySet, parse_final_answer,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Bounded-concurrency batch generator.
pub struct GeneratorPool<B: GenerationBackend + 'static> {
    backend: Arc<B>,
    selector: Mutex<StrategySelector>,
    semaphore: Arc<Semaphore>,
    workers: usize,
    max_output: u32,
    call_timeout: Duration,
}

impl<B: GenerationBackend + 'static> GeneratorPool<B> {
    pub fn new(backend: Arc<B>, strategies: StrategySet, params: &EnsembleParams) -> Self {
        let workers = params.effective_workers();
        let selector = StrategySelector::new(
            strategies,
            params.selection_mode,
            (params.temperature_min, params.temperature_max),
            params.seed,
        );
        Self {
            backend,
            selector: Mutex::new(selector),
            semaphore: Arc::new(Semaphore::new(workers)),
            workers,
            max_output: params.max_output,
            call_timeout: params.call_timeout,
        }
    }

    /// Number of generation calls allowed in flight at once.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Generate `count` outcomes without progress reporting.
    pub async fn generate_batch(
        &self,
        round: usize,
        count: usize,
        question: &Question,
        context: &ResearchContext,
    ) -> Vec<GenerationOutcome> {
        self.generate_batch_with_progress(round, count, question, context, &NoProgress)
            .await
    }

    /// Generate `count` outcomes, index-aligned with slot order.
    ///
    /// Returns only after every slot has completed, failed or timed out.
    pub async fn generate_batch_with_progress(
        &self,
        round: usize,
        count: usize,
        question: &Question,
        context: &ResearchContext,
        progress: &dyn RoundProgressNotifier,
    ) -> Vec<GenerationOutcome> {
        let draws = {
            let mut selector = self
                .selector
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            selector.draw_batch(count)
        };

        debug!(
            "Round {}: dispatching {} generations on {} workers",
            round,
            draws.len(),
            self.workers
        );

        let prompt = PromptTemplate::generation_prompt(question.content(), context);
        let strategy_names: Vec<String> = draws.iter().map(|d| d.strategy.name.clone()).collect();

        let mut join_set = JoinSet::new();
        for (slot, draw) in draws.iter().cloned().enumerate() {
            let backend = Arc::clone(&self.backend);
            let semaphore = Arc::clone(&self.semaphore);
            let request = self.build_request(draw, &prompt);

            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let deadline = request.deadline;
                let result = tokio::time::timeout(deadline, backend.generate(&request)).await;
                (slot, request.strategy, result)
            });
        }

        let mut slots: Vec<Option<GenerationOutcome>> = vec![None; draws.len()];

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((slot, strategy, result)) => {
                    let outcome = match result {
                        Ok(Ok(text)) => Self::to_outcome(round, slot, strategy.name(), &text),
                        Ok(Err(e)) => {
                            let kind = match &e {
                                BackendError::Timeout => FailureKind::Timeout,
                                _ => FailureKind::Backend,
                            };
                            GenerationOutcome::Failed(GenerationFailure::new(
                                slot,
                                round,
                                strategy.name(),
                                kind,
                                e.to_string(),
                            ))
                        }
                        Err(_) => GenerationOutcome::Failed(GenerationFailure::new(
                            slot,
                            round,
                            strategy.name(),
                            FailureKind::Timeout,
                            format!("no response within {:?}", self.call_timeout),
                        )),
                    };

                    if let GenerationOutcome::Failed(failure) = &outcome {
                        warn!("Generation failed: {}", failure);
                    }
                    progress.on_generation_complete(round, slot, &strategy, outcome.is_success());
                    if let Some(entry) = slots.get_mut(slot) {
                        *entry = Some(outcome);
                    }
                }
                Err(e) => {
                    warn!("Generation task failed: {}", e);
                }
            }
        }

        // Slots left empty belong to tasks that panicked or were cancelled.
        slots
            .into_iter()
            .enumerate()
            .map(|(slot, outcome)| {
                outcome.unwrap_or_else(|| {
                    let strategy = strategy_names.get(slot).cloned().unwrap_or_default();
                    if let Some(draw) = draws.get(slot) {
                        progress.on_generation_complete(round, slot, &draw.strategy, false);
                    }
                    GenerationOutcome::Failed(GenerationFailure::new(
                        slot,
                        round,
                        strategy,
                        FailureKind::Backend,
                        "generation task aborted",
                    ))
                })
            })
            .collect()
    }

    fn build_request(&self, draw: SlotDraw, prompt: &str) -> GenerationRequest {
        GenerationRequest {
            system_prompt: PromptTemplate::generator_system(&draw.strategy),
            strategy: draw.strategy,
            prompt: prompt.to_string(),
            temperature: draw.temperature,
            max_output: self.max_output,
            deadline: self.call_timeout,
        }
    }

    /// Interpret raw backend text; anything without a final answer is malformed.
    fn to_outcome(round: usize, slot: usize, strategy: &str, text: &str) -> GenerationOutcome {
        match parse_final_answer(text) {
            Ok(answer) => {
                debug!("Round {} slot {} ({}): {}", round, slot, strategy, answer);
                GenerationOutcome::Generated(Candidate::new(answer, round).with_strategy(strategy))
            }
            Err(e) => GenerationOutcome::Failed(GenerationFailure::new(
                slot,
                round,
                strategy,
                FailureKind::Malformed,
                e.to_string(),
            )),
        }
    }
}
