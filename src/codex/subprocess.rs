//! Codex CLI spawning.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::CodexError;

/// Environment variable the Codex CLI reads its API key from.
const API_KEY_VAR: &str = "CODEX_API_KEY";

/// Check if Codex CLI is installed and accessible.
pub async fn check_codex_installed() -> Result<(), CodexError> {
    if which::which("codex").is_err() {
        return Err(CodexError::NotInstalled);
    }

    let version_check = Command::new("codex")
        .arg("--version")
        .output()
        .await
        .map_err(CodexError::SpawnFailed)?;

    if !version_check.status.success() {
        return Err(CodexError::NotInstalled);
    }

    Ok(())
}

/// A configured invocation of `codex exec`.
#[derive(Debug, Clone)]
pub struct CodexCli {
    model: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
}

impl CodexCli {
    pub fn new(model: Option<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            model,
            api_key,
            timeout,
        }
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    fn args<'a>(&'a self, prompt: &'a str) -> Vec<&'a str> {
        let mut args = vec!["exec"];
        if let Some(model) = self.model.as_deref() {
            args.push("-m");
            args.push(model);
        }
        args.push(prompt);
        args
    }

    /// Run `codex exec` with a prompt and return the free-form text response.
    pub async fn run(&self, prompt: &str) -> Result<String, CodexError> {
        if which::which("codex").is_err() {
            return Err(CodexError::NotInstalled);
        }

        let timeout_secs = self.timeout.as_secs();
        debug!(
            "Running codex (model={:?}, prompt={} chars, timeout={}s)",
            self.model,
            prompt.len(),
            timeout_secs
        );

        let mut cmd = Command::new("codex");
        cmd.args(self.args(prompt))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(key) = self.api_key.as_deref() {
            cmd.env(API_KEY_VAR, key);
        }

        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| CodexError::Timeout(timeout_secs))?
            .map_err(CodexError::SpawnFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let code = output.status.code().unwrap_or(-1);
            return Err(CodexError::NonZeroExit { code, stderr });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            return Err(CodexError::ExecutionFailed("empty output".to_string()));
        }
        Ok(stdout)
    }
}
