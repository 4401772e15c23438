//! Ollama generation backend

use super::client::{ChatRequest, OllamaClient};
use async_trait::async_trait;
use ensemble_application::ports::generation_backend::{
    BackendError, GenerationBackend, GenerationRequest,
};
use std::sync::Arc;
use tracing::debug;

/// [`GenerationBackend`] that asks a local Ollama model for one JSON answer.
pub struct OllamaGenerationBackend {
    client: Arc<OllamaClient>,
    model: String,
}

impl OllamaGenerationBackend {
    pub fn new(client: Arc<OllamaClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_request(&self, request: &GenerationRequest) -> ChatRequest {
        ChatRequest::new(
            &self.model,
            &request.system_prompt,
            &request.prompt,
            request.temperature,
            request.max_output,
        )
        .json_format()
    }
}

#[async_trait]
impl GenerationBackend for OllamaGenerationBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        debug!(
            "Generating with {} as '{}' at temperature {:.2}",
            self.model, request.strategy.name, request.temperature
        );
        let chat = self.chat_request(request);
        self.client
            .chat(&chat, Some(request.deadline))
            .await
            .map_err(BackendError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_domain::{PromptTemplate, Strategy};
    use std::time::Duration;

    #[test]
    fn test_chat_request_carries_generation_settings() {
        let client = Arc::new(OllamaClient::new("http://localhost:11434").unwrap());
        let backend = OllamaGenerationBackend::new(client, "llama3.2");
        let strategy = Strategy::new("direct", "Answer directly.").unwrap();
        let request = GenerationRequest {
            system_prompt: PromptTemplate::generator_system(&strategy),
            strategy,
            prompt: "Question:\n2 + 2".to_string(),
            temperature: 0.35,
            max_output: 300,
            deadline: Duration::from_secs(60),
        };

        let chat = backend.chat_request(&request);

        assert_eq!(chat.model, "llama3.2");
        assert_eq!(chat.format.as_deref(), Some("json"));
        assert_eq!(chat.options.num_predict, 300);
        assert_eq!(chat.options.temperature, 0.35);
        assert!(chat.messages[0].content.starts_with("Answer directly."));
        assert_eq!(chat.messages[1].content, "Question:\n2 + 2");
    }
}
