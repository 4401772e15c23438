//! Structured answer requirements
//!
//! Requirements arrive already parsed (extracting them from free text is
//! somebody else's job). Each one can be checked two ways:
//!
//! - [`Requirement::is_violated_by`] — a *provable* violation that removes
//!   the candidate before clustering (out-of-domain value, non-integer where
//!   an integer is required);
//! - [`Requirement::is_satisfied_by`] — full compliance, used by the
//!   precision gate, tie-breaking and representative selection.

use super::answer::{AnswerForm, AnswerKind};
use super::cluster::ABSOLUTE_TOLERANCE;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Format class an answer must be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatClass {
    Integer,
    Decimal,
    Fraction,
}

impl FormatClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatClass::Integer => "integer",
            FormatClass::Decimal => "decimal",
            FormatClass::Fraction => "fraction",
        }
    }
}

impl std::fmt::Display for FormatClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FormatClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "integer" | "int" => Ok(FormatClass::Integer),
            "decimal" | "float" => Ok(FormatClass::Decimal),
            "fraction" => Ok(FormatClass::Fraction),
            other => Err(format!(
                "Unknown format class: {}. Valid: integer, decimal, fraction",
                other
            )),
        }
    }
}

/// A single structured constraint on the answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// At least `digits` digits after the decimal separator. Exact forms
    /// (integers, fractions, named constants) only count when `allow_exact`.
    Precision { digits: usize, allow_exact: bool },
    /// Required textual format class
    Format { class: FormatClass },
    /// Inclusive numeric bounds; either side may be open
    Domain { min: Option<f64>, max: Option<f64> },
}

impl Requirement {
    pub fn precision(digits: usize) -> Self {
        Requirement::Precision {
            digits,
            allow_exact: false,
        }
    }

    pub fn format(class: FormatClass) -> Self {
        Requirement::Format { class }
    }

    pub fn domain(min: Option<f64>, max: Option<f64>) -> Result<Self, DomainError> {
        if min.is_some_and(f64::is_nan) || max.is_some_and(f64::is_nan) {
            return Err(DomainError::InvalidRequirement(
                "domain bound cannot be NaN".to_string(),
            ));
        }
        if let (Some(lo), Some(hi)) = (min, max)
            && lo > hi
        {
            return Err(DomainError::InvalidRequirement(format!(
                "domain min {} is greater than max {}",
                lo, hi
            )));
        }
        Ok(Requirement::Domain { min, max })
    }

    pub fn is_precision(&self) -> bool {
        matches!(self, Requirement::Precision { .. })
    }

    /// Provable violation, removing the candidate before clustering.
    pub fn is_violated_by(&self, form: &AnswerForm) -> bool {
        match self {
            Requirement::Domain { .. } => match form.value {
                Some(v) => !self.within_domain(v),
                None => false,
            },
            Requirement::Format {
                class: FormatClass::Integer,
            } => !is_integral(form),
            Requirement::Format { .. } | Requirement::Precision { .. } => false,
        }
    }

    /// Full compliance.
    pub fn is_satisfied_by(&self, form: &AnswerForm) -> bool {
        match *self {
            Requirement::Precision {
                digits,
                allow_exact,
            } => match form.kind {
                AnswerKind::Decimal { fraction_digits } => fraction_digits >= digits,
                _ => allow_exact && form.is_exact(),
            },
            Requirement::Format { class } => match class {
                FormatClass::Integer => is_integral(form),
                FormatClass::Decimal => matches!(form.kind, AnswerKind::Decimal { .. }),
                FormatClass::Fraction => form.kind == AnswerKind::Fraction,
            },
            Requirement::Domain { .. } => form.value.is_some_and(|v| self.within_domain(v)),
        }
    }

    fn within_domain(&self, v: f64) -> bool {
        match *self {
            Requirement::Domain { min, max } => {
                min.is_none_or(|lo| v >= lo) && max.is_none_or(|hi| v <= hi)
            }
            _ => true,
        }
    }

    pub fn describe(&self) -> String {
        match *self {
            Requirement::Precision {
                digits,
                allow_exact: false,
            } => format!("{} decimal digits", digits),
            Requirement::Precision {
                digits,
                allow_exact: true,
            } => format!("{} decimal digits (exact forms allowed)", digits),
            Requirement::Format { class } => format!("{} format", class),
            Requirement::Domain { min, max } => match (min, max) {
                (Some(lo), Some(hi)) => format!("value in [{}, {}]", lo, hi),
                (Some(lo), None) => format!("value >= {}", lo),
                (None, Some(hi)) => format!("value <= {}", hi),
                (None, None) => "any value".to_string(),
            },
        }
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

fn is_integral(form: &AnswerForm) -> bool {
    form.value
        .is_some_and(|v| (v - v.round()).abs() <= ABSOLUTE_TOLERANCE)
}

/// Zero or more requirements for one run. Empty means no gate applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementSet {
    requirements: Vec<Requirement>,
}

impl RequirementSet {
    pub fn new(requirements: Vec<Requirement>) -> Self {
        Self { requirements }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter()
    }

    /// The active precision requirement, if any.
    pub fn precision(&self) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.is_precision())
    }

    pub fn is_violated_by(&self, form: &AnswerForm) -> bool {
        self.requirements.iter().any(|r| r.is_violated_by(form))
    }

    pub fn is_satisfied_by(&self, form: &AnswerForm) -> bool {
        self.requirements.iter().all(|r| r.is_satisfied_by(form))
    }
}

impl std::fmt::Display for RequirementSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.requirements.is_empty() {
            return write!(f, "none");
        }
        let parts: Vec<String> = self.requirements.iter().map(|r| r.describe()).collect();
        write!(f, "{}", parts.join(", "))
    }
}
