//! Progress notification port
//!
//! Defines the interface for reporting progress during an ensemble run.

use ensemble_domain::{Decision, Strategy};

/// Callback for progress updates during an ensemble run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain text, etc.)
pub trait RoundProgressNotifier: Send + Sync {
    /// Called when a round starts requesting `requested` generations
    fn on_round_start(&self, round: usize, requested: usize);

    /// Called when one generation slot finishes
    fn on_generation_complete(&self, round: usize, slot: usize, strategy: &Strategy, success: bool);

    /// Called after the round's evaluation
    fn on_round_complete(&self, round: usize, decision: &Decision);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl RoundProgressNotifier for NoProgress {
    fn on_round_start(&self, _round: usize, _requested: usize) {}
    fn on_generation_complete(
        &self,
        _round: usize,
        _slot: usize,
        _strategy: &Strategy,
        _success: bool,
    ) {
    }
    fn on_round_complete(&self, _round: usize, _decision: &Decision) {}
}
