//! Port for structured run transcripts.
//!
//! Defines the [`RunLogger`] trait for recording run events (context,
//! candidates, failures, evaluations) to a machine-readable log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures the run in a form
//! that can be replayed and audited (JSONL).

use serde_json::Value;

/// A structured run event.
pub struct RunEvent {
    /// Event type identifier (e.g., "candidate", "evaluation").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl RunEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging run events.
///
/// `log` is synchronous and infallible; logging failures never disturb a run.
pub trait RunLogger: Send + Sync {
    fn log(&self, event: RunEvent);
}

/// No-op implementation for tests and when transcripts are disabled.
pub struct NoRunLogger;

impl RunLogger for NoRunLogger {
    fn log(&self, _event: RunEvent) {}
}
