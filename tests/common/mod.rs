//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use cluecommit::error::{ClaudeError, CodexError, EditorError, GitError};
use cluecommit::llm::{LlmError, LlmProviderError, Provider};
use cluecommit::{
    Decision, Editor, GenerationRequest, MessageGenerator, ReviewMode, Reviewer, StagedChanges,
    VersionControl,
};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory, with an
    /// identity configured so the `git` binary can commit.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
            config.set_bool("commit.gpgsign", false).unwrap();
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file in the work tree without staging it.
    pub fn write(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Write a file and add it to the index.
    pub fn stage(&self, name: &str, content: &str) {
        self.write(name, content);
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Delete a tracked file and stage the deletion.
    pub fn stage_delete(&self, name: &str) {
        std::fs::remove_file(self.dir.path().join(name)).expect("Failed to remove file");
        let mut index = self.repo.index().expect("Failed to get index");
        index.remove_path(Path::new(name)).expect("Failed to remove from index");
        index.write().expect("Failed to write index");
    }

    /// Commit whatever is in the index. Returns the commit OID.
    pub fn commit_index(&self, message: &str) -> Oid {
        let sig = self.signature();
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        // Get parent commit if exists
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Message of the commit HEAD points at.
    pub fn head_message(&self) -> String {
        self.repo
            .head()
            .expect("No HEAD")
            .peel_to_commit()
            .expect("HEAD is not a commit")
            .message()
            .unwrap_or_default()
            .to_string()
    }

    /// Install an executable pre-commit hook with the given script body.
    #[cfg(unix)]
    pub fn install_pre_commit_hook(&self, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let hooks = self.repo.path().join("hooks");
        std::fs::create_dir_all(&hooks).expect("Failed to create hooks dir");
        let path = hooks.join("pre-commit");
        std::fs::write(&path, script).expect("Failed to write hook");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to chmod hook");
        path
    }
}

// ---------------------------------------------------------------------------
// Collaborator fakes for workflow tests
// ---------------------------------------------------------------------------

/// Everything the fake repository was asked to do, in order.
#[derive(Debug, Default)]
pub struct VcsLog {
    pub calls: Vec<String>,
    pub commits: Vec<String>,
}

/// `VersionControl` with scripted results.
pub struct FakeVcs {
    pub log: Arc<Mutex<VcsLog>>,
    pub tool_installed: bool,
    pub in_repository: bool,
    pub hook: Option<(PathBuf, bool)>,
    pub hook_fails: bool,
    pub changes: StagedChanges,
    pub detect_error: Option<String>,
    pub commit_error: Option<String>,
}

impl FakeVcs {
    pub fn with_changes(changes: StagedChanges) -> Self {
        Self {
            log: Arc::new(Mutex::new(VcsLog::default())),
            tool_installed: true,
            in_repository: true,
            hook: None,
            hook_fails: false,
            changes,
            detect_error: None,
            commit_error: None,
        }
    }

    fn record(&self, call: &str) {
        self.log.lock().unwrap().calls.push(call.to_string());
    }
}

impl VersionControl for FakeVcs {
    fn verify_tool_installed(&self) -> Result<(), GitError> {
        self.record("verify_tool_installed");
        if self.tool_installed {
            Ok(())
        } else {
            Err(GitError::NotInstalled)
        }
    }

    fn verify_inside_repository(&self) -> Result<(), GitError> {
        self.record("verify_inside_repository");
        if self.in_repository {
            Ok(())
        } else {
            Err(GitError::NotARepository(git2::Error::from_str("not a repo")))
        }
    }

    fn stage_all_tracked(&self) -> Result<(), GitError> {
        self.record("stage_all_tracked");
        Ok(())
    }

    fn detect_staged_changes(&self) -> Result<StagedChanges, GitError> {
        self.record("detect_staged_changes");
        match &self.detect_error {
            Some(err) => Err(GitError::DetectionAborted(err.clone())),
            None => Ok(self.changes.clone()),
        }
    }

    fn pre_commit_hook_path(&self) -> Option<PathBuf> {
        self.hook.as_ref().map(|(path, _)| path.clone())
    }

    fn is_executable(&self, path: &Path) -> bool {
        self.hook
            .as_ref()
            .is_some_and(|(hook, executable)| hook == path && *executable)
    }

    fn run_pre_commit_hook(&self, _path: &Path) -> Result<(), GitError> {
        self.record("run_pre_commit_hook");
        if self.hook_fails {
            Err(GitError::HookFailed { code: Some(1) })
        } else {
            Ok(())
        }
    }

    fn commit(&self, message: &str) -> Result<String, GitError> {
        self.record("commit");
        if let Some(err) = &self.commit_error {
            return Err(GitError::CommitFailed(err.clone()));
        }
        self.log.lock().unwrap().commits.push(message.to_string());
        Ok("[main abc1234] committed".to_string())
    }
}

/// One recorded generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateCall {
    pub diff: String,
    pub deleted_files: Vec<String>,
    pub refinement: Option<String>,
}

/// `MessageGenerator` that replays scripted answers and records requests.
pub struct FakeGenerator {
    pub calls: Arc<Mutex<Vec<GenerateCall>>>,
    responses: VecDeque<Result<String, ()>>,
}

impl FakeGenerator {
    pub fn new(responses: Vec<Result<&str, ()>>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            responses: responses
                .into_iter()
                .map(|r| r.map(str::to_string))
                .collect(),
        }
    }
}

fn failed_generation() -> LlmError {
    LlmError {
        primary: Provider::Claude,
        primary_error: LlmProviderError::Claude(ClaudeError::NotInstalled),
        fallback: Provider::Codex,
        fallback_error: LlmProviderError::Codex(CodexError::Timeout(300)),
    }
}

#[async_trait]
impl MessageGenerator for FakeGenerator {
    fn supports_deleted_files(&self) -> bool {
        true
    }

    async fn generate(&mut self, request: GenerationRequest<'_>) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(GenerateCall {
            diff: request.diff.to_string(),
            deleted_files: request.deleted_files.to_vec(),
            refinement: request.refinement.map(str::to_string),
        });

        match self.responses.pop_front() {
            Some(Ok(message)) => Ok(message),
            Some(Err(())) | None => Err(failed_generation()),
        }
    }
}

/// `Reviewer` that replays scripted decisions and records what it was shown.
pub struct FakeReviewer {
    pub shown: Arc<Mutex<Vec<(String, ReviewMode)>>>,
    decisions: VecDeque<Decision>,
}

impl FakeReviewer {
    pub fn new(decisions: Vec<Decision>) -> Self {
        Self {
            shown: Arc::new(Mutex::new(Vec::new())),
            decisions: decisions.into(),
        }
    }
}

impl Reviewer for FakeReviewer {
    fn review(&mut self, message: &str, mode: ReviewMode) -> Decision {
        self.shown.lock().unwrap().push((message.to_string(), mode));
        self.decisions.pop_front().unwrap_or(Decision::Cancel)
    }
}

/// `Editor` that applies scripted replacements and records the files it saw.
pub struct FakeEditor {
    pub paths: Arc<Mutex<Vec<PathBuf>>>,
    replacements: Mutex<VecDeque<Option<String>>>,
}

impl FakeEditor {
    /// `None` fails the editor run; `Some(text)` writes `text`.
    pub fn new(replacements: Vec<Option<&str>>) -> Self {
        Self {
            paths: Arc::new(Mutex::new(Vec::new())),
            replacements: Mutex::new(
                replacements
                    .into_iter()
                    .map(|r| r.map(str::to_string))
                    .collect(),
            ),
        }
    }
}

impl Editor for FakeEditor {
    fn edit(&self, path: &Path) -> Result<(), EditorError> {
        self.paths.lock().unwrap().push(path.to_path_buf());
        match self.replacements.lock().unwrap().pop_front() {
            Some(Some(text)) => {
                std::fs::write(path, text).map_err(EditorError::TempFile)?;
                Ok(())
            }
            Some(None) => Err(EditorError::NonZeroExit {
                program: "fake-editor".to_string(),
                code: Some(1),
            }),
            None => Ok(()),
        }
    }
}

/// A typical staged change set.
pub fn sample_changes() -> StagedChanges {
    StagedChanges {
        modified_files: vec!["src/lib.rs".to_string()],
        deleted_files: vec!["src/old.rs".to_string()],
        diff_text: "+pub fn added() {}\n".to_string(),
        truncated: false,
    }
}
