//! Ensemble consensus domain
//!
//! This module contains the core concepts for deciding whether a set of
//! independently generated answers agrees on one trustworthy value.
//!
//! # Core Concepts
//!
//! ## Candidate Ledger
//! Every answer ever produced in a run, append-only and in insertion order.
//! Insertion order is what breaks ties inside a cluster.
//!
//! ## Consensus Evaluation
//! A deterministic pass over the ledger: hygiene, requirement filtering,
//! tolerance-based clustering, support counting and reliability gating.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Ensemble Round                                                  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   Strategy draw ──► Generation ──► parse_final_answer            │
//! │                                        │                         │
//! │                                        ▼                         │
//! │                              CandidateLedger (append)            │
//! │                                        │                         │
//! │                                        ▼                         │
//! │      AnswerForm ──► Requirements ──► Clusters ──► Decision       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod answer;
pub mod candidate;
pub mod cluster;
pub mod evaluator;
pub mod ledger;
pub mod parsing;
pub mod requirement;
pub mod strategy;

// Re-export main types
pub use answer::{AnswerForm, AnswerKind};
pub use candidate::{
    Candidate, FailureKind, GenerationFailure, GenerationOutcome, partition_outcomes,
};
pub use cluster::{ABSOLUTE_TOLERANCE, Cluster, RELATIVE_TOLERANCE, Tolerance, cluster_forms};
pub use evaluator::{
    ConsensusEvaluator, ConsensusPolicy, Decision, InsufficientReason, Selection,
};
pub use ledger::CandidateLedger;
pub use parsing::{OutputParseError, parse_final_answer};
pub use requirement::{FormatClass, Requirement, RequirementSet};
pub use strategy::{SelectionMode, Strategy, StrategySet};
