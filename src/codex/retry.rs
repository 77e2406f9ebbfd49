//! Exponential backoff retry logic for Codex CLI.

use async_trait::async_trait;

use crate::error::CodexError;
use crate::llm::retry::retry_with_backoff;

use super::subprocess::CodexCli;

/// Trait for executing Codex CLI commands.
///
/// This abstraction allows mocking the Codex subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodexExecutor: Send + Sync {
    /// Run Codex with the given prompt and return the raw response.
    async fn run(&self, prompt: &str) -> Result<String, CodexError>;
}

#[async_trait]
impl CodexExecutor for CodexCli {
    async fn run(&self, prompt: &str) -> Result<String, CodexError> {
        CodexCli::run(self, prompt).await
    }
}

/// Generate a raw text response with retry logic.
pub async fn generate_with_retry<E: CodexExecutor>(
    prompt: &str,
    executor: &E,
) -> Result<String, CodexError> {
    retry_with_backoff(
        || async { executor.run(prompt).await },
        |e| !matches!(e, CodexError::NotInstalled),
        |e| CodexError::RetriesExhausted(Box::new(e)),
    )
    .await
}
