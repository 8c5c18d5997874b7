//! Prompt assembly

mod prompt;

pub use prompt::PromptBuilder;
