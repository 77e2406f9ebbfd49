//! Retry wrapper and response parsing for the Claude CLI.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ClaudeError;
use crate::llm::retry::retry_with_backoff;

use super::subprocess::ClaudeCli;

/// Trait for executing Claude CLI commands.
///
/// This abstraction allows mocking the Claude subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClaudeExecutor: Send + Sync {
    /// Run Claude with the given prompt and return the raw response.
    async fn run(&self, prompt: &str) -> Result<String, ClaudeError>;
}

#[async_trait]
impl ClaudeExecutor for ClaudeCli {
    async fn run(&self, prompt: &str) -> Result<String, ClaudeError> {
        ClaudeCli::run(self, prompt).await
    }
}

/// Generate text with retry logic.
///
/// Makes up to 3 attempts with exponential backoff. A missing CLI is not retried.
pub async fn generate_with_retry<E: ClaudeExecutor>(
    prompt: &str,
    executor: &E,
) -> Result<String, ClaudeError> {
    retry_with_backoff(
        || async { try_generate(prompt, executor).await },
        |e| !matches!(e, ClaudeError::NotInstalled),
        |e| ClaudeError::RetriesExhausted(Box::new(e)),
    )
    .await
}

async fn try_generate<E: ClaudeExecutor>(
    prompt: &str,
    executor: &E,
) -> Result<String, ClaudeError> {
    let response = executor.run(prompt).await?;
    parse_claude_response(&response)
}

/// Claude CLI JSON envelope when using --output-format json
#[derive(Deserialize)]
struct ClaudeCliResponse {
    result: String,
    #[serde(default)]
    is_error: bool,
}

/// Pull the model's text out of Claude's JSON envelope.
///
/// Output that is not an envelope is treated as the text itself.
pub(crate) fn parse_claude_response(response: &str) -> Result<String, ClaudeError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(ClaudeError::InvalidResponse("empty output".to_string()));
    }

    match serde_json::from_str::<ClaudeCliResponse>(trimmed) {
        Ok(envelope) if envelope.is_error => Err(ClaudeError::ExecutionFailed(envelope.result)),
        Ok(envelope) => Ok(envelope.result),
        Err(_) if trimmed.starts_with('{') => Err(ClaudeError::InvalidResponse(format!(
            "unexpected JSON: {}",
            trimmed.chars().take(200).collect::<String>()
        ))),
        Err(_) => Ok(trimmed.to_string()),
    }
}
