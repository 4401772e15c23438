//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Strategy set cannot be empty")]
    EmptyStrategySet,

    #[error("Invalid strategy: {0}")]
    InvalidStrategy(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid requirement: {0}")]
    InvalidRequirement(String),
}
