//! Spinner shown while a long-running step is awaited.

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK_INTERVAL: Duration = Duration::from_millis(120);

/// Wraps one awaited step with a spinner on stderr.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    visible: bool,
}

impl Progress {
    pub fn spinner() -> Self {
        Self { visible: true }
    }

    /// Draws nothing. Used in tests and non-interactive runs.
    pub fn hidden() -> Self {
        Self { visible: false }
    }

    /// Await `work` while `message` spins, then clear the line.
    pub async fn run<F, T>(&self, message: &str, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let pb = if self.visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(TICK_INTERVAL);

        let output = work.await;

        pb.finish_and_clear();
        output
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::spinner()
    }
}
