//! Core domain concepts shared across all subdomains.
//!
//! - [`question::Question`] — a validated question to pose to the ensemble
//! - [`error::DomainError`] — domain-level errors
//! - [`string`] — small text helpers used by formatters and logs

pub mod error;
pub mod question;
pub mod string;
