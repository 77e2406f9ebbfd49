//! Claude CLI spawning.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::ClaudeError;

/// Environment variable the Claude CLI reads its API key from.
const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Check if Claude Code CLI is installed and accessible.
///
/// Uses the `which` crate for cross-platform executable detection.
pub async fn check_claude_installed() -> Result<(), ClaudeError> {
    if which::which("claude").is_err() {
        return Err(ClaudeError::NotInstalled);
    }

    let version_check = Command::new("claude")
        .arg("--version")
        .output()
        .await
        .map_err(ClaudeError::SpawnFailed)?;

    if !version_check.status.success() {
        return Err(ClaudeError::NotInstalled);
    }

    Ok(())
}

/// A configured invocation of the Claude Code CLI.
#[derive(Debug, Clone)]
pub struct ClaudeCli {
    model: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
}

impl ClaudeCli {
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

    /// Build the argument list: `-p <prompt> --output-format json [--model M]`.
    fn args<'a>(&'a self, prompt: &'a str) -> Vec<&'a str> {
        let mut args = vec!["-p", prompt, "--output-format", "json"];
        if let Some(model) = self.model.as_deref() {
            args.push("--model");
            args.push(model);
        }
        args
    }

    /// Run Claude CLI with a prompt and return its raw stdout.
    ///
    /// If the configured timeout is exceeded, returns `ClaudeError::Timeout`.
    pub async fn run(&self, prompt: &str) -> Result<String, ClaudeError> {
        if which::which("claude").is_err() {
            return Err(ClaudeError::NotInstalled);
        }

        let timeout_secs = self.timeout.as_secs();
        debug!(
            "Running claude (model={:?}, prompt={} chars, timeout={}s)",
            self.model,
            prompt.len(),
            timeout_secs
        );

        let mut cmd = Command::new("claude");
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
            .map_err(|_| ClaudeError::Timeout(timeout_secs))?
            .map_err(ClaudeError::SpawnFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let code = output.status.code().unwrap_or(-1);
            return Err(ClaudeError::NonZeroExit { code, stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
