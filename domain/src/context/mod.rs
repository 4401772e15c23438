//! Research context
//!
//! A one-time, immutable blob of background facts produced before the first
//! round. The ensemble never inspects it beyond rendering it into prompts.

mod research;

pub use research::ResearchContext;
