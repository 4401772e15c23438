//! Application-layer configuration types.

pub mod ensemble_params;

pub use ensemble_params::EnsembleParams;
