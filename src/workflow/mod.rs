//! The generate, review, and commit loop.
//!
//! [`Workflow`] wires a [`VersionControl`], a [`MessageGenerator`], a
//! [`Reviewer`], and an [`Editor`] together. Detection and generation each run
//! as a single awaited unit of work behind a spinner; everything else is
//! sequential.

pub mod progress;

use std::sync::Arc;

use tracing::{debug, info, warn};

pub use progress::Progress;

use crate::edit::{EditExit, EditSession, Editor};
use crate::error::{GitError, WorkflowError};
use crate::git::{StagedChanges, VersionControl};
use crate::llm::{GenerationRequest, MessageGenerator};
use crate::review::{Decision, ReviewMode, Reviewer};

/// Caller-chosen options for one run.
#[derive(Debug, Clone, Default)]
pub struct WorkflowOptions {
    /// Stage modifications to tracked files before detection.
    pub stage_all: bool,
    /// Clue applied to the first generation.
    pub initial_clue: Option<String>,
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// Committed with this exact message.
    Committed(String),
    Cancelled,
}

/// What the review loop decided to do next.
enum Next {
    Generate,
    Commit(String),
    Cancel,
}

pub struct Workflow<V, G, R, E> {
    vcs: Arc<V>,
    generator: G,
    reviewer: R,
    editor: E,
    progress: Progress,
}

impl<V, G, R, E> Workflow<V, G, R, E>
where
    V: VersionControl + 'static,
    G: MessageGenerator,
    R: Reviewer,
    E: Editor,
{
    pub fn new(vcs: V, generator: G, reviewer: R, editor: E) -> Self {
        Self {
            vcs: Arc::new(vcs),
            generator,
            reviewer,
            editor,
            progress: Progress::spinner(),
        }
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub async fn run(&mut self, options: WorkflowOptions) -> Result<WorkflowOutcome, WorkflowError> {
        self.check_preconditions()?;

        if options.stage_all {
            debug!("Staging all tracked changes");
            self.vcs.stage_all_tracked()?;
        }

        let changes = self.detect().await?;
        if changes.is_empty() {
            return Err(GitError::NothingStaged.into());
        }
        report_staged_files(&changes);

        let mut refinement = normalize_clue(options.initial_clue);

        loop {
            let message = self.generate(&changes, refinement.as_deref()).await?;

            let next = match self.reviewer.review(&message, ReviewMode::PreEdit) {
                Decision::Confirm => Next::Commit(message),
                Decision::Regenerate => Next::Generate,
                Decision::RequestClue(clue) => {
                    refinement = apply_clue(clue);
                    Next::Generate
                }
                Decision::Edit => {
                    match EditSession::new(message, &self.editor, &mut self.reviewer).run()? {
                        EditExit::Commit(edited) => Next::Commit(edited),
                        EditExit::Regenerate => Next::Generate,
                        EditExit::Clue(clue) => {
                            refinement = apply_clue(clue);
                            Next::Generate
                        }
                        EditExit::Cancel => Next::Cancel,
                    }
                }
                Decision::Cancel => Next::Cancel,
            };

            match next {
                Next::Generate => continue,
                Next::Commit(message) => return self.commit(message),
                Next::Cancel => {
                    println!("Commit cancelled");
                    return Ok(WorkflowOutcome::Cancelled);
                }
            }
        }
    }

    fn check_preconditions(&self) -> Result<(), GitError> {
        self.vcs.verify_tool_installed()?;
        self.vcs.verify_inside_repository()?;

        if !self.vcs.has_pre_commit_hook() {
            return Ok(());
        }
        let Some(path) = self.vcs.pre_commit_hook_path() else {
            return Ok(());
        };
        if !self.vcs.is_executable(&path) {
            warn!("Pre-commit hook {} is not executable, skipping", path.display());
            return Ok(());
        }

        println!("Running pre-commit hook...");
        self.vcs.run_pre_commit_hook(&path)
    }

    async fn detect(&self) -> Result<StagedChanges, GitError> {
        let vcs = Arc::clone(&self.vcs);
        let task = tokio::task::spawn_blocking(move || vcs.detect_staged_changes());

        self.progress
            .run("Detecting staged files...", task)
            .await
            .map_err(|e| GitError::DetectionAborted(e.to_string()))?
    }

    async fn generate(
        &mut self,
        changes: &StagedChanges,
        refinement: Option<&str>,
    ) -> Result<String, WorkflowError> {
        let request = GenerationRequest {
            diff: &changes.diff_text,
            deleted_files: &changes.deleted_files,
            refinement,
            truncated: changes.truncated,
        };

        let result = self
            .progress
            .run(
                "The AI is analyzing your changes...",
                self.generator.generate(request),
            )
            .await;

        match result {
            Ok(message) if message.trim().is_empty() => Err(WorkflowError::EmptyMessage),
            Ok(message) => Ok(message),
            Err(e) => {
                debug!("Generation failed: {}", e.detailed());
                Err(WorkflowError::GenerationFailed(e))
            }
        }
    }

    fn commit(&self, message: String) -> Result<WorkflowOutcome, WorkflowError> {
        let summary = self.vcs.commit(&message)?;
        info!("Committed {} chars", message.len());

        println!("Successfully committed!");
        if !summary.is_empty() {
            println!("{summary}");
        }
        Ok(WorkflowOutcome::Committed(message))
    }
}

/// A blank clue means no clue.
fn normalize_clue(clue: Option<String>) -> Option<String> {
    clue.filter(|c| !c.trim().is_empty())
}

/// A fresh clue replaces the previous one; an empty one clears it.
fn apply_clue(clue: String) -> Option<String> {
    let refinement = normalize_clue(Some(clue));
    if refinement.is_some() {
        println!("Regenerating with provided clue...");
    }
    refinement
}

fn report_staged_files(changes: &StagedChanges) {
    println!("Detected {} staged file(s):", changes.total_files());

    let modified = changes.modified_files.iter().map(|f| f.to_string());
    let deleted = changes.deleted_files.iter().map(|f| format!("{f} (deleted)"));
    for (i, line) in modified.chain(deleted).enumerate() {
        println!("   {}. {}", i + 1, line);
    }
}
