//! Domain layer for ensemble-quorum
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Ensemble
//!
//! Several noisy producers answer the same question independently. The
//! ensemble trusts an answer only when enough of them agree:
//!
//! - **Candidate Ledger**: every answer produced across rounds, never pruned
//! - **Consensus Evaluator**: deterministic clustering and gating over the ledger
//!
//! ## Requirements
//!
//! Optional structured constraints (precision, format, domain) that filter
//! candidates and break ties.

pub mod config;
pub mod context;
pub mod core;
pub mod ensemble;
pub mod prompt;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use context::ResearchContext;
pub use core::{error::DomainError, question::Question};
pub use prompt::PromptTemplate;

// Re-export ensemble types
pub use ensemble::{
    AnswerForm, AnswerKind, Candidate, CandidateLedger, Cluster, ConsensusEvaluator,
    ConsensusPolicy, Decision, FailureKind, FormatClass, GenerationFailure, GenerationOutcome,
    InsufficientReason, OutputParseError, Requirement, RequirementSet, Selection, SelectionMode,
    Strategy, StrategySet, Tolerance, parse_final_answer, partition_outcomes,
};
