//! Question value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// The query every generator in the ensemble answers independently.
///
/// Stored trimmed; blank input is rejected at construction so nothing
/// downstream has to re-check it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Question {
    content: String,
}

impl Question {
    /// Try to create a new question, returning None for blank input
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self {
                content: trimmed.to_string(),
            })
        }
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<String> for Question {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Question::try_new(value)
            .ok_or_else(|| DomainError::InvalidQuestion("question cannot be empty".to_string()))
    }
}

impl TryFrom<&str> for Question {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Question::try_from(value.to_string())
    }
}

impl From<Question> for String {
    fn from(q: Question) -> Self {
        q.content
    }
}
