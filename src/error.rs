//! Error types for cluecommit modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

use crate::llm::LlmError;

/// Errors from the version-control collaborator.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git is not installed or could not be executed. Install git and make sure it is on your PATH")]
    NotInstalled,

    #[error("The current directory must be a git repository: {0}")]
    NotARepository(#[source] git2::Error),

    #[error("Pre-commit hook failed with {}", code.map_or("a signal".to_string(), |c| format!("exit code {c}")))]
    HookFailed { code: Option<i32> },

    #[error("Failed to run pre-commit hook {path}: {source}")]
    HookSpawnFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to update tracked files: {0}")]
    StageFailed(String),

    #[error(
        "No staged changes found. Stage your changes manually, or automatically stage all tracked changes with the `--all` flag"
    )]
    NothingStaged,

    #[error("Failed to detect staged changes: {0}")]
    DetectionFailed(#[source] git2::Error),

    #[error("Staged change detection did not complete: {0}")]
    DetectionAborted(String),

    #[error("Failed to commit changes: {0}")]
    CommitFailed(String),
}

/// Errors from Claude CLI operations.
#[derive(Error, Debug)]
pub enum ClaudeError {
    #[error("Claude Code CLI not found. Install with: npm install -g @anthropic-ai/claude-code")]
    NotInstalled,

    #[error("Claude Code CLI failed to execute: {0}")]
    ExecutionFailed(String),

    #[error("Failed to spawn Claude process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Claude returned an unreadable response: {0}")]
    InvalidResponse(String),

    #[error("Claude process timed out after {0} seconds")]
    Timeout(u64),

    #[error("Claude CLI exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<ClaudeError>),
}

/// Errors from Codex CLI operations.
#[derive(Error, Debug)]
pub enum CodexError {
    #[error(
        "Codex CLI not found. Install with: npm install -g @openai/codex (then run `codex` or set CODEX_API_KEY)"
    )]
    NotInstalled,

    #[error("Codex CLI failed to execute: {0}")]
    ExecutionFailed(String),

    #[error("Failed to spawn Codex process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Codex process timed out after {0} seconds")]
    Timeout(u64),

    #[error("Codex CLI exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<CodexError>),
}

/// Errors from the external editor used by the edit session.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Editor '{0}' not found. Set $EDITOR or `[editor] command` in the config file")]
    NotFound(String),

    #[error("Editor command is empty")]
    EmptyCommand,

    #[error("Failed to launch editor '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Editor '{program}' exited with {}", code.map_or("a signal".to_string(), |c| format!("code {c}")))]
    NonZeroExit { program: String, code: Option<i32> },

    #[error("Failed to prepare commit message file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("Failed to read edited commit message: {0}")]
    ReadBack(#[source] std::io::Error),
}

/// Errors from loading or saving the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine a config directory for this platform")]
    NoConfigDir,

    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] toml::ser::Error),
}

/// Errors that end a commit workflow run.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error("No commit message was generated. Try again: {}", .0.summary())]
    GenerationFailed(#[source] LlmError),

    #[error("No commit message was generated. Try again")]
    EmptyMessage,

    #[error("Editing the commit message failed: {0}")]
    Edit(#[from] EditorError),
}
