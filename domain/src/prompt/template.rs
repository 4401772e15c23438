//! Prompt templates for the ensemble flow

use crate::context::ResearchContext;
use crate::ensemble::strategy::Strategy;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Instruction appended to every generator persona.
    const ANSWER_FORMAT: &'static str = r#"Respond with a single JSON object and nothing else:
{"final_answer": "<your answer>"}
Put only the final value in "final_answer" - no units, no explanation."#;

    /// System prompt for one generation call under `strategy`
    pub fn generator_system(strategy: &Strategy) -> String {
        format!("{}\n\n{}", strategy.persona.trim(), Self::ANSWER_FORMAT)
    }

    /// User prompt for one generation call
    pub fn generation_prompt(question: &str, context: &ResearchContext) -> String {
        match context.render() {
            Some(facts) => format!(
                "Background:\n{}\n\nQuestion:\n{}",
                facts, question
            ),
            None => format!("Question:\n{}", question),
        }
    }

    /// System prompt for the one-time research step
    pub fn research_system() -> &'static str {
        r#"You are a research assistant preparing background for a team of solvers.
Collect the facts, definitions and constraints needed to answer the question.
Do not answer the question yourself.
Wrap the output in this JSON format and provide no other text:
{"topic": "<topic>", "summary": "<facts and constraints>", "sources": ["<source>"], "tools_used": []}"#
    }

    /// User prompt for the research step
    pub fn research_prompt(question: &str) -> String {
        format!("Gather background for this question:\n\n{}", question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_system_includes_persona_and_format() {
        let strategy = Strategy::new("direct", "Give only the result.").unwrap();
        let prompt = PromptTemplate::generator_system(&strategy);
        assert!(prompt.starts_with("Give only the result."));
        assert!(prompt.contains("\"final_answer\""));
    }

    #[test]
    fn test_generation_prompt_without_context() {
        let prompt = PromptTemplate::generation_prompt("2 + 2", &ResearchContext::empty());
        assert_eq!(prompt, "Question:\n2 + 2");
    }

    #[test]
    fn test_generation_prompt_with_context() {
        let ctx = ResearchContext {
            topic: "Arithmetic".to_string(),
            summary: "Addition".to_string(),
            sources: vec![],
            tools_used: vec![],
        };
        let prompt = PromptTemplate::generation_prompt("2 + 2", &ctx);
        assert!(prompt.starts_with("Background:\nTopic: Arithmetic"));
        assert!(prompt.ends_with("Question:\n2 + 2"));
    }
}
