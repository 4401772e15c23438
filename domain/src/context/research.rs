use serde::{Deserialize, Serialize};

/// Background facts gathered once per run by the research provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchContext {
    pub topic: String,
    pub summary: String,
    #[serde(default, alias = "source")]
    pub sources: Vec<String>,
    #[serde(default)]
    pub tools_used: Vec<String>,
}

impl ResearchContext {
    /// Context for runs without a research step.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.topic.trim().is_empty() && self.summary.trim().is_empty() && self.sources.is_empty()
    }

    /// Prompt-ready text, or `None` when there is nothing to add.
    pub fn render(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut out = String::new();
        if !self.topic.trim().is_empty() {
            out.push_str(&format!("Topic: {}\n", self.topic.trim()));
        }
        if !self.summary.trim().is_empty() {
            out.push_str(&format!("Summary: {}\n", self.summary.trim()));
        }
        if !self.sources.is_empty() {
            out.push_str("Sources:\n");
            for source in &self.sources {
                out.push_str(&format!("- {}\n", source));
            }
        }
        Some(out.trim_end().to_string())
    }
}
