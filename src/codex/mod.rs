//! Codex CLI integration.

pub mod retry;
pub mod subprocess;

pub use retry::{CodexExecutor, generate_with_retry};
pub use subprocess::{CodexCli, check_codex_installed};
