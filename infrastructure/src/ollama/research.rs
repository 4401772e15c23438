//! Ollama research context provider

use super::client::{ChatRequest, OllamaClient};
use async_trait::async_trait;
use ensemble_application::ports::context_provider::{ContextError, ContextProvider};
use ensemble_domain::{PromptTemplate, Question, ResearchContext};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const RESEARCH_TEMPERATURE: f32 = 0.3;
const RESEARCH_MAX_OUTPUT: u32 = 600;

/// [`ContextProvider`] that asks a model for structured background facts.
pub struct OllamaResearchProvider {
    client: Arc<OllamaClient>,
    model: String,
    timeout: Duration,
}

impl OllamaResearchProvider {
    pub fn new(client: Arc<OllamaClient>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            model: model.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ContextProvider for OllamaResearchProvider {
    async fn produce(&self, question: &Question) -> Result<ResearchContext, ContextError> {
        info!("Gathering research context with {}", self.model);
        let request = ChatRequest::new(
            &self.model,
            PromptTemplate::research_system(),
            PromptTemplate::research_prompt(question.content()),
            RESEARCH_TEMPERATURE,
            RESEARCH_MAX_OUTPUT,
        )
        .json_format();

        let text = self.client.chat(&request, Some(self.timeout)).await?;
        debug!("Research response: {}", text);
        parse_research(&text)
    }
}

/// Parse a research response into a [`ResearchContext`].
///
/// Accepts the object on its own or embedded in surrounding text.
pub fn parse_research(text: &str) -> Result<ResearchContext, ContextError> {
    let trimmed = text.trim();
    let candidate = match serde_json::from_str::<ResearchContext>(trimmed) {
        Ok(context) => Ok(context),
        Err(first) => match (trimmed.find('{'), trimmed.rfind('}')) {
            (Some(start), Some(end)) if end > start => {
                serde_json::from_str::<ResearchContext>(&trimmed[start..=end])
                    .map_err(|e| ContextError::Malformed(e.to_string()))
            }
            _ => Err(ContextError::Malformed(first.to_string())),
        },
    }?;

    if candidate.topic.trim().is_empty() && candidate.summary.trim().is_empty() {
        return Err(ContextError::Malformed(
            "research output has neither topic nor summary".to_string(),
        ));
    }
    Ok(candidate)
}
