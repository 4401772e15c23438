//! Application layer for ensemble-quorum
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::EnsembleParams;
pub use ports::{
    context_provider::{ContextError, ContextProvider, NoResearch},
    generation_backend::{BackendError, GenerationBackend, GenerationRequest},
    progress::{NoProgress, RoundProgressNotifier},
    run_logger::{NoRunLogger, RunEvent, RunLogger},
};
pub use use_cases::generator_pool::GeneratorPool;
pub use use_cases::run_ensemble::{
    EnsembleOutcome, RoundState, RunEnsembleError, RunEnsembleInput, RunEnsembleUseCase,
};
pub use use_cases::strategy_selector::{SlotDraw, StrategySelector};
