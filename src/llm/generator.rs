//! The message generator seen by the commit workflow.

use async_trait::async_trait;
use tracing::debug;

use super::clean::clean_message;
use super::prompt::{PromptInput, build_commit_prompt};
use super::router::{LlmError, LlmRouter, ProviderRunner};

/// One generation request: the staged diff plus an optional clue.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub diff: &'a str,
    pub deleted_files: &'a [String],
    pub refinement: Option<&'a str>,
    pub truncated: bool,
}

/// Produces candidate commit messages.
///
/// An `Ok` with an empty string is a valid answer; the workflow decides what
/// an empty message means.
#[async_trait]
pub trait MessageGenerator: Send {
    /// Whether deleted file names are fed to the model.
    fn supports_deleted_files(&self) -> bool;

    async fn generate(&mut self, request: GenerationRequest<'_>) -> Result<String, LlmError>;
}

#[async_trait]
impl<R: ProviderRunner> MessageGenerator for LlmRouter<R> {
    fn supports_deleted_files(&self) -> bool {
        self.include_deleted_files()
    }

    async fn generate(&mut self, request: GenerationRequest<'_>) -> Result<String, LlmError> {
        let prompt = build_commit_prompt(
            &PromptInput {
                diff: request.diff,
                deleted_files: request.deleted_files,
                refinement: request.refinement,
                truncated: request.truncated,
            },
            self.supports_deleted_files(),
        );
        debug!("Commit prompt length: {} chars", prompt.len());

        let completion = self.generate_raw(&prompt).await?;
        debug!("Message generated by {}", completion.provider);
        Ok(clean_message(&completion.output))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::ClaudeError;
    use crate::llm::router::{LlmProviderError, Provider, ProviderSelection};

    /// Records prompts and answers with a fixed response.
    struct RecordingRunner {
        response: Result<String, ()>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ProviderRunner for RecordingRunner {
        async fn run(&self, _provider: Provider, prompt: &str) -> Result<String, LlmProviderError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.response
                .clone()
                .map_err(|_| LlmProviderError::Claude(ClaudeError::NotInstalled))
        }
    }

    fn router(response: Result<String, ()>, include_deleted: bool) -> (LlmRouter<RecordingRunner>, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let runner = RecordingRunner {
            response,
            prompts: prompts.clone(),
        };
        (
            LlmRouter::with_runner(ProviderSelection::default(), runner, include_deleted),
            prompts,
        )
    }

    #[tokio::test]
    async fn test_generate_cleans_fenced_output() {
        let (mut router, _) = router(Ok("```\nfeat: add x\n```".to_string()), true);
        let deleted = Vec::new();
        let message = router
            .generate(GenerationRequest {
                diff: "+x",
                deleted_files: &deleted,
                refinement: None,
                truncated: false,
            })
            .await
            .unwrap();
        assert_eq!(message, "feat: add x");
    }

    #[tokio::test]
    async fn test_generate_passes_clue_and_deleted_files() {
        let (mut router, prompts) = router(Ok("fix: y".to_string()), true);
        let deleted = vec!["gone.rs".to_string()];
        router
            .generate(GenerationRequest {
                diff: "+y",
                deleted_files: &deleted,
                refinement: Some("fix typo"),
                truncated: false,
            })
            .await
            .unwrap();

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("with additional focus on fix typo"));
        assert!(prompts[0].contains("- gone.rs"));
    }

    #[tokio::test]
    async fn test_capability_flag_hides_deleted_files() {
        let (mut router, prompts) = router(Ok("fix: y".to_string()), false);
        assert!(!router.supports_deleted_files());
        let deleted = vec!["gone.rs".to_string()];
        router
            .generate(GenerationRequest {
                diff: "+y",
                deleted_files: &deleted,
                refinement: None,
                truncated: false,
            })
            .await
            .unwrap();

        assert!(!prompts.lock().unwrap()[0].contains("gone.rs"));
    }

    #[tokio::test]
    async fn test_both_providers_failing_is_error() {
        let (mut router, prompts) = router(Err(()), true);
        let result = router
            .generate(GenerationRequest {
                diff: "+y",
                deleted_files: &[],
                refinement: None,
                truncated: false,
            })
            .await;
        assert!(result.is_err());
        // Primary and fallback each got the prompt once
        assert_eq!(prompts.lock().unwrap().len(), 2);
    }
}
