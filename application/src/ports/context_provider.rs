//! Research context port
//!
//! Produces the one-time background context consumed by every generation
//! call. A failure here is fatal to the run; there is no retry.

use async_trait::async_trait;
use ensemble_domain::{Question, ResearchContext};
use thiserror::Error;

/// Errors from context production
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Research backend error: {0}")]
    Backend(String),

    #[error("Malformed research output: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ContextProvider: Send + Sync {
    async fn produce(&self, question: &Question) -> Result<ResearchContext, ContextError>;
}

/// Provider for runs without a research step.
pub struct NoResearch;

#[async_trait]
impl ContextProvider for NoResearch {
    async fn produce(&self, _question: &Question) -> Result<ResearchContext, ContextError> {
        Ok(ResearchContext::empty())
    }
}
