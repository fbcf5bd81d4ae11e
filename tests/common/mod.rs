//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use ai_commit::error::{GenerateError, SessionError};
use ai_commit::llm::{GenerationRequest, TextGenerator};
use ai_commit::session::{Answer, SelectOption, Session};
use async_trait::async_trait;
use git2::{IndexAddOption, Oid, Repository, RepositoryInitOptions, Signature};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty repository on `main` with a local identity.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).expect("Failed to init git repo");

        let mut config = repo.config().expect("Failed to open repo config");
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        config.set_bool("commit.gpgsign", false).unwrap();

        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file relative to the repository root.
    pub fn write_file(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Add a path to the index.
    pub fn stage(&self, rel: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(rel)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Commit everything in the working tree. Returns the commit OID.
    pub fn commit_all(&self, message: &str) -> Oid {
        let sig = self.signature();
        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_all(["*"], IndexAddOption::DEFAULT, None)
            .expect("Failed to add files");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Point `refs/remotes/origin/HEAD` at `origin/<branch>`, as a clone would.
    pub fn set_origin_head(&self, branch: &str, oid: Oid) {
        let target = format!("refs/remotes/origin/{branch}");
        self.repo
            .reference(&target, oid, true, "test: remote branch")
            .expect("Failed to create remote ref");
        self.repo
            .reference_symbolic("refs/remotes/origin/HEAD", &target, true, "test: origin HEAD")
            .expect("Failed to create origin HEAD");
    }

    /// Create and check out a local branch at HEAD.
    pub fn checkout_new_branch(&self, name: &str) {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to resolve HEAD");
        self.repo.branch(name, &head, false).expect("Failed to create branch");
        self.repo
            .set_head(&format!("refs/heads/{name}"))
            .expect("Failed to set HEAD");
    }

    pub fn current_branch(&self) -> String {
        self.repo
            .head()
            .expect("Failed to read HEAD")
            .shorthand()
            .unwrap_or_default()
            .to_string()
    }

    pub fn head_message(&self) -> String {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to resolve HEAD")
            .message()
            .unwrap_or_default()
            .to_string()
    }

    pub fn commit_count(&self) -> usize {
        let mut walk = self.repo.revwalk().expect("Failed to create revwalk");
        if walk.push_head().is_err() {
            return 0;
        }
        walk.count()
    }
}

/// Canned answer for the next prompt of a [`ScriptedSession`].
pub enum Scripted {
    Confirm(Answer<bool>),
    Select(Answer<usize>),
    Multi(Answer<Vec<usize>>),
}

/// A [`Session`] that replays scripted answers and records what it showed.
#[derive(Default)]
pub struct ScriptedSession {
    answers: VecDeque<Scripted>,
    pub events: Vec<String>,
}

impl ScriptedSession {
    pub fn with(answers: Vec<Scripted>) -> Self {
        Self {
            answers: answers.into(),
            events: Vec::new(),
        }
    }

    pub fn saw(&self, event: &str) -> bool {
        self.events.iter().any(|e| e == event)
    }

    pub fn saw_prefix(&self, prefix: &str) -> bool {
        self.events.iter().any(|e| e.starts_with(prefix))
    }
}

impl Session for ScriptedSession {
    fn spinner_start(&mut self, label: &str) {
        self.events.push(format!("spinner: {label}"));
    }

    fn spinner_message(&mut self, label: &str) {
        self.events.push(format!("message: {label}"));
    }

    fn spinner_stop(&mut self, label: &str) {
        self.events.push(format!("stop: {label}"));
    }

    fn note(&mut self, text: &str, title: &str) {
        self.events.push(format!("note: {title}: {text}"));
    }

    fn confirm(&mut self, prompt: &str) -> Result<Answer<bool>, SessionError> {
        match self.answers.pop_front() {
            Some(Scripted::Confirm(a)) => Ok(a),
            _ => panic!("unexpected confirm: {prompt}"),
        }
    }

    fn select(
        &mut self,
        prompt: &str,
        _options: &[SelectOption],
    ) -> Result<Answer<usize>, SessionError> {
        match self.answers.pop_front() {
            Some(Scripted::Select(a)) => Ok(a),
            _ => panic!("unexpected select: {prompt}"),
        }
    }

    fn multiselect(
        &mut self,
        prompt: &str,
        options: &[SelectOption],
    ) -> Result<Answer<Vec<usize>>, SessionError> {
        let labels: Vec<String> = options.iter().map(SelectOption::display).collect();
        self.events.push(format!("multiselect: {}", labels.join(", ")));
        match self.answers.pop_front() {
            Some(Scripted::Multi(a)) => Ok(a),
            _ => panic!("unexpected multiselect: {prompt}"),
        }
    }

    fn done(&mut self, message: &str) {
        self.events.push(format!("done: {message}"));
    }

    fn complete(&mut self, message: &str) {
        self.events.push(format!("complete: {message}"));
    }
}

/// A [`TextGenerator`] returning queued replies in order.
#[derive(Default)]
pub struct StubGenerator {
    replies: Mutex<VecDeque<Result<Vec<String>, GenerateError>>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl StubGenerator {
    pub fn replying(replies: Vec<Result<Vec<String>, GenerateError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::default(),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, GenerateError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no reply queued for request {}", self.request_count()))
    }
}

/// Owned strings from string literals.
pub fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
