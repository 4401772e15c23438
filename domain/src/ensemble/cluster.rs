//! Equivalence clustering
//!
//! Candidates are grouped greedily in ledger order: each candidate joins
//! the first existing cluster whose anchor (earliest member) it is
//! equivalent to, otherwise it starts a new cluster. Anchoring on the
//! earliest member keeps the partition deterministic even though
//! tolerance-based equality is not transitive.

use super::answer::AnswerForm;
use serde::{Deserialize, Serialize};

/// Relative tolerance for numeric equivalence.
pub const RELATIVE_TOLERANCE: f64 = 1e-6;

/// Absolute tolerance for numeric equivalence (dominates near zero).
pub const ABSOLUTE_TOLERANCE: f64 = 1e-9;

/// Numeric equivalence rule: `|a-b| <= max(relative * max(|a|,|b|), absolute)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub relative: f64,
    pub absolute: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            relative: RELATIVE_TOLERANCE,
            absolute: ABSOLUTE_TOLERANCE,
        }
    }
}

impl Tolerance {
    pub fn values_equal(&self, a: f64, b: f64) -> bool {
        let bound = (self.relative * a.abs().max(b.abs())).max(self.absolute);
        (a - b).abs() <= bound
    }

    /// Numbers compare by value; text compares by exact normalized string.
    /// A number never equals a text answer.
    pub fn equivalent(&self, a: &AnswerForm, b: &AnswerForm) -> bool {
        match (a.value, b.value) {
            (Some(x), Some(y)) => self.values_equal(x, y),
            (None, None) => a.normalized == b.normalized,
            _ => false,
        }
    }
}

/// A set of mutually equivalent candidates, identified by ledger index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Ledger indices in ascending (insertion) order
    members: Vec<usize>,
    /// Normalized form of the earliest member
    anchor: AnswerForm,
}

impl Cluster {
    fn new(index: usize, anchor: AnswerForm) -> Self {
        Self {
            members: vec![index],
            anchor,
        }
    }

    /// Number of members
    pub fn support(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Ledger index of the earliest-inserted member
    pub fn earliest(&self) -> usize {
        self.members[0]
    }

    pub fn anchor(&self) -> &AnswerForm {
        &self.anchor
    }

    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }
}

/// Partition `(ledger_index, form)` pairs into clusters.
///
/// Input must be in ledger order; clusters come back ordered by their
/// earliest member.
pub fn cluster_forms<'a>(
    entries: impl IntoIterator<Item = (usize, &'a AnswerForm)>,
    tolerance: &Tolerance,
) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    for (index, form) in entries {
        match clusters
            .iter_mut()
            .find(|c| tolerance.equivalent(&c.anchor, form))
        {
            Some(cluster) => cluster.members.push(index),
            None => clusters.push(Cluster::new(index, form.clone())),
        }
    }
    clusters
}
