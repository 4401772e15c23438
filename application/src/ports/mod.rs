//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod context_provider;
pub mod generation_backend;
pub mod progress;
pub mod run_logger;
