//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod generator_pool;
pub mod run_ensemble;
pub mod strategy_selector;
