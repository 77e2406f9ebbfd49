//! LLM provider routing, prompt construction, and the message generator.

pub mod clean;
pub mod generator;
pub mod prompt;
pub mod retry;
pub mod router;

pub use clean::clean_message;
pub use generator::{GenerationRequest, MessageGenerator};
pub use prompt::{PromptInput, build_commit_prompt};
pub use router::{
    CliRunner, LlmCompletion, LlmError, LlmProviderError, LlmRouter, Provider, ProviderRunner,
    ProviderSelection,
};
