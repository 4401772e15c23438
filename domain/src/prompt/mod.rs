//! Prompt domain
//!
//! Templates for generator and research prompts.

mod template;

pub use template::PromptTemplate;
