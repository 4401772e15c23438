//! Candidate ledger
//!
//! Append-only, order-preserving store for every candidate produced during
//! one orchestration run. The ledger never deduplicates and never shrinks:
//! repeated answers are distinct entries and each one counts as support.

use super::candidate::Candidate;
use std::sync::RwLock;

/// Thread-safe append-only candidate sequence.
///
/// Appends are serialized by a single writer lock; readers take a
/// consistent [`snapshot`](Self::snapshot) that later appends cannot alter.
#[derive(Debug, Default)]
pub struct CandidateLedger {
    entries: RwLock<Vec<Candidate>>,
}

impl CandidateLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch in the given order. Returns the ledger length afterwards.
    pub fn append(&self, candidates: impl IntoIterator<Item = Candidate>) -> usize {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.extend(candidates);
        entries.len()
    }

    /// Ordered copy of every candidate appended so far.
    pub fn snapshot(&self) -> Vec<Candidate> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
