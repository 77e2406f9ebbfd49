//! Claude CLI integration.

pub mod retry;
pub mod subprocess;

pub use retry::{ClaudeExecutor, generate_with_retry};
pub use subprocess::{ClaudeCli, check_claude_installed};
