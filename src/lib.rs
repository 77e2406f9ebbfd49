//! cluecommit - generate a commit message from staged changes, review it in
//! the terminal, and commit.
//!
//! # Overview
//!
//! cluecommit reads the staged diff with git2, asks the Claude Code or Codex
//! CLI for a conventional commit message, and lets the user accept it,
//! regenerate it, steer it with a short clue, or hand-edit it before
//! committing.

pub mod claude;
pub mod codex;
pub mod config;
pub mod edit;
pub mod error;
pub mod git;
pub mod llm;
pub mod review;
pub mod workflow;

// Re-export commonly used types
pub use config::Config;
pub use edit::{EditExit, EditSession, Editor, ExternalEditor};
pub use error::{ClaudeError, CodexError, ConfigError, EditorError, GitError, WorkflowError};
pub use git::{GitRepository, StagedChanges, VersionControl};
pub use llm::{GenerationRequest, LlmError, LlmRouter, MessageGenerator, Provider};
pub use review::{Decision, ReviewMode, Reviewer, TerminalReviewer};
pub use workflow::{Progress, Workflow, WorkflowOptions, WorkflowOutcome};
