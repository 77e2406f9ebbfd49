//! Provider selection and fallback orchestration.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::claude::ClaudeCli;
use crate::codex::CodexCli;
use crate::config::LlmSettings;
use crate::error::{ClaudeError, CodexError};

/// Supported LLM providers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Claude,
    Codex,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Claude => "Claude",
            Provider::Codex => "Codex",
        }
    }

    /// Model names offered by `config model set` for this provider.
    pub fn known_models(&self) -> &'static [&'static str] {
        match self {
            Provider::Claude => &["sonnet", "opus", "haiku"],
            Provider::Codex => &["gpt-5-codex", "gpt-5", "o4-mini"],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary + fallback selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSelection {
    pub primary: Provider,
    pub fallback: Provider,
}

impl ProviderSelection {
    pub fn from_primary(primary: Provider) -> Self {
        let fallback = match primary {
            Provider::Claude => Provider::Codex,
            Provider::Codex => Provider::Claude,
        };
        Self { primary, fallback }
    }
}

impl Default for ProviderSelection {
    fn default() -> Self {
        ProviderSelection::from_primary(Provider::Claude)
    }
}

/// Provider-specific error wrapper.
#[derive(Debug)]
pub enum LlmProviderError {
    Claude(ClaudeError),
    Codex(CodexError),
}

impl LlmProviderError {
    pub fn summary(&self) -> String {
        match self {
            LlmProviderError::Claude(err) => summarize_claude_error(err),
            LlmProviderError::Codex(err) => summarize_codex_error(err),
        }
    }

    pub fn detail(&self) -> String {
        match self {
            LlmProviderError::Claude(err) => err.to_string(),
            LlmProviderError::Codex(err) => err.to_string(),
        }
    }
}

impl fmt::Display for LlmProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for LlmProviderError {}

impl From<ClaudeError> for LlmProviderError {
    fn from(err: ClaudeError) -> Self {
        LlmProviderError::Claude(err)
    }
}

impl From<CodexError> for LlmProviderError {
    fn from(err: CodexError) -> Self {
        LlmProviderError::Codex(err)
    }
}

/// Both providers failed to produce a message.
#[derive(Debug)]
pub struct LlmError {
    pub primary: Provider,
    pub primary_error: LlmProviderError,
    pub fallback: Provider,
    pub fallback_error: LlmProviderError,
}

impl LlmError {
    pub fn summary(&self) -> String {
        format!(
            "Both LLM providers failed. {} error: {}. {} error: {}.",
            self.primary,
            self.primary_error.summary(),
            self.fallback,
            self.fallback_error.summary()
        )
    }

    pub fn detailed(&self) -> String {
        format!(
            "Both LLM providers failed. {} error: {}. {} error: {}.",
            self.primary,
            self.primary_error.detail(),
            self.fallback,
            self.fallback_error.detail()
        )
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for LlmError {}

/// Successful generation with metadata.
#[derive(Debug)]
pub struct LlmCompletion {
    pub output: String,
    pub provider: Provider,
    pub primary_error: Option<LlmProviderError>,
}

/// Runs a prompt against one provider.
#[async_trait]
pub trait ProviderRunner: Send + Sync {
    async fn run(&self, provider: Provider, prompt: &str) -> Result<String, LlmProviderError>;
}

/// Runner backed by the real Claude and Codex CLIs.
pub struct CliRunner {
    claude: ClaudeCli,
    codex: CodexCli,
}

impl CliRunner {
    /// Build both CLIs from the same settings. The model name only applies
    /// to the configured provider; the fallback runs with its own default.
    pub fn new(settings: &LlmSettings) -> Self {
        let model_for = |provider: Provider| {
            if provider == settings.provider {
                settings.model.clone()
            } else {
                None
            }
        };

        Self {
            claude: ClaudeCli::new(
                model_for(Provider::Claude),
                settings.api_key.clone().filter(|_| settings.provider == Provider::Claude),
                settings.timeout(),
            ),
            codex: CodexCli::new(
                model_for(Provider::Codex),
                settings.api_key.clone().filter(|_| settings.provider == Provider::Codex),
                settings.timeout(),
            ),
        }
    }
}

#[async_trait]
impl ProviderRunner for CliRunner {
    async fn run(&self, provider: Provider, prompt: &str) -> Result<String, LlmProviderError> {
        match provider {
            Provider::Claude => crate::claude::generate_with_retry(prompt, &self.claude)
                .await
                .map_err(LlmProviderError::from),
            Provider::Codex => crate::codex::generate_with_retry(prompt, &self.codex)
                .await
                .map_err(LlmProviderError::from),
        }
    }
}

/// Provider router with fallback and stickiness.
pub struct LlmRouter<R = CliRunner> {
    primary: Provider,
    fallback: Provider,
    runner: R,
    include_deleted_files: bool,
}

impl LlmRouter<CliRunner> {
    pub fn new(settings: &LlmSettings) -> Self {
        Self::with_runner(
            ProviderSelection::from_primary(settings.provider),
            CliRunner::new(settings),
            settings.include_deleted_files,
        )
    }
}

impl<R: ProviderRunner> LlmRouter<R> {
    pub fn with_runner(selection: ProviderSelection, runner: R, include_deleted_files: bool) -> Self {
        Self {
            primary: selection.primary,
            fallback: selection.fallback,
            runner,
            include_deleted_files,
        }
    }

    pub fn primary(&self) -> Provider {
        self.primary
    }

    pub fn fallback(&self) -> Provider {
        self.fallback
    }

    pub fn include_deleted_files(&self) -> bool {
        self.include_deleted_files
    }

    /// Run the prompt on the primary provider, falling back on failure.
    ///
    /// A successful fallback becomes the primary for later calls, so a
    /// regenerate loop does not keep paying for a broken provider.
    pub async fn generate_raw(&mut self, prompt: &str) -> Result<LlmCompletion, LlmError> {
        let primary = self.primary;
        let fallback = self.fallback;

        match self.runner.run(primary, prompt).await {
            Ok(output) => Ok(LlmCompletion {
                output,
                provider: primary,
                primary_error: None,
            }),
            Err(primary_error) => {
                warn!("{} failed: {}. Trying {}", primary, primary_error.detail(), fallback);
                match self.runner.run(fallback, prompt).await {
                    Ok(output) => {
                        debug!("{} succeeded, making it the primary provider", fallback);
                        self.primary = fallback;
                        self.fallback = primary;
                        Ok(LlmCompletion {
                            output,
                            provider: fallback,
                            primary_error: Some(primary_error),
                        })
                    }
                    Err(fallback_error) => Err(LlmError {
                        primary,
                        primary_error,
                        fallback,
                        fallback_error,
                    }),
                }
            }
        }
    }
}

fn summarize_claude_error(err: &ClaudeError) -> String {
    match err {
        ClaudeError::NotInstalled => "Claude CLI not found".to_string(),
        ClaudeError::ExecutionFailed(_) => "Claude CLI reported an error".to_string(),
        ClaudeError::SpawnFailed(_) => "Failed to start Claude CLI".to_string(),
        ClaudeError::InvalidResponse(_) => "Claude returned an unreadable response".to_string(),
        ClaudeError::Timeout(secs) => format!("Claude timed out after {}s", secs),
        ClaudeError::NonZeroExit { code, .. } => format!("Claude CLI exited with code {}", code),
        ClaudeError::RetriesExhausted(_) => "Claude failed after retries".to_string(),
    }
}

fn summarize_codex_error(err: &CodexError) -> String {
    match err {
        CodexError::NotInstalled => "Codex CLI not found".to_string(),
        CodexError::ExecutionFailed(_) => "Codex CLI reported an error".to_string(),
        CodexError::SpawnFailed(_) => "Failed to start Codex CLI".to_string(),
        CodexError::Timeout(secs) => format!("Codex timed out after {}s", secs),
        CodexError::NonZeroExit { code, .. } => format!("Codex CLI exited with code {}", code),
        CodexError::RetriesExhausted(_) => "Codex failed after retries".to_string(),
    }
}
