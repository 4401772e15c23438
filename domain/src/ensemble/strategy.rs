//! Generation strategies
//!
//! A [`Strategy`] is a named persona the generation backend adopts for one
//! call. The ensemble draws strategies with replacement from a fixed,
//! non-empty [`StrategySet`] so that candidates come from diverse approaches.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A generation persona/approach (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Strategy {
    /// Short tag (e.g., "direct", "stepwise")
    pub name: String,
    /// System-role text handed to the backend
    pub persona: String,
}

impl Strategy {
    pub fn new(name: impl Into<String>, persona: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let persona = persona.into();
        if name.trim().is_empty() {
            return Err(DomainError::InvalidStrategy(
                "strategy name cannot be empty".to_string(),
            ));
        }
        if persona.trim().is_empty() {
            return Err(DomainError::InvalidStrategy(format!(
                "strategy '{}' has an empty persona",
                name
            )));
        }
        Ok(Self {
            name: name.trim().to_string(),
            persona,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A fixed, non-empty, ordered set of strategies known at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategySet {
    strategies: Vec<Strategy>,
}

impl StrategySet {
    pub fn new(strategies: Vec<Strategy>) -> Result<Self, DomainError> {
        if strategies.is_empty() {
            return Err(DomainError::EmptyStrategySet);
        }
        Ok(Self { strategies })
    }

    /// The built-in personas: a terse calculator, an algebraist and a
    /// step-by-step solver.
    pub fn builtin() -> Self {
        Self {
            strategies: vec![
                Strategy {
                    name: "direct".to_string(),
                    persona: "You are a math specialist that calculates different equations. \
                              Give only the result of the given equation. No text, just result."
                        .to_string(),
                },
                Strategy {
                    name: "algebraic".to_string(),
                    persona: "You are an algebraist. Rewrite the problem symbolically, simplify \
                              it, and only then evaluate it to a single final value."
                        .to_string(),
                },
                Strategy {
                    name: "stepwise".to_string(),
                    persona: "You solve problems carefully one step at a time, checking every \
                              intermediate result before moving on to the next step."
                        .to_string(),
                },
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Strategy> {
        self.strategies.get(index)
    }

    pub fn as_slice(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn iter(&self) -> impl Iterator<Item = &Strategy> {
        self.strategies.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }
}

impl Default for StrategySet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// How a strategy is drawn for each generation call.
///
/// Both modes sample with replacement; they differ only in the draw
/// mechanism (choosing an element vs. drawing an index and looking it up),
/// which matters when replaying a seeded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Choose an element uniformly from the set
    #[default]
    Uniform,
    /// Draw an explicit index in `0..len`
    Indexed,
}

impl SelectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::Uniform => "uniform",
            SelectionMode::Indexed => "indexed",
        }
    }
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uniform" | "choice" => Ok(SelectionMode::Uniform),
            "indexed" | "index" => Ok(SelectionMode::Indexed),
            other => Err(format!(
                "Unknown selection mode: {}. Valid: uniform, indexed",
                other
            )),
        }
    }
}
