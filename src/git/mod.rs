//! Git adapter: status queries and repository mutations via the git binary.
//!
//! Every query accepts an exclude list, passed to git as `:(exclude)`
//! pathspecs so globs behave exactly as they do on the command line.

pub mod files;
pub mod runner;

use std::path::PathBuf;

use tracing::debug;

use crate::error::GitError;

pub use files::{FileSets, WorkedFile};
pub use runner::{GitRunner, SystemGit};

#[cfg(test)]
pub use runner::MockGitRunner;

const ORIGIN_HEAD: &str = "refs/remotes/origin/HEAD";
const ORIGIN_PREFIX: &str = "refs/remotes/origin/";

/// Staged paths together with the staged diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedChanges {
    pub files: Vec<String>,
    pub diff: String,
}

/// High-level git operations on top of a [`GitRunner`].
pub struct Git<R: GitRunner = SystemGit> {
    runner: R,
}

impl<R: GitRunner> Git<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn git<I, S>(&self, args: I) -> Result<String, GitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runner
            .run(args.into_iter().map(Into::into).collect())
            .await
    }

    /// Absolute path of the repository root.
    pub async fn toplevel(&self) -> Result<PathBuf, GitError> {
        let out = self.git(["rev-parse", "--show-toplevel"]).await?;
        Ok(PathBuf::from(out.trim()))
    }

    pub async fn staged_files(&self, excludes: &[String]) -> Result<Vec<String>, GitError> {
        let mut args = vec![
            "diff".to_string(),
            "--cached".into(),
            "--name-only".into(),
            "-z".into(),
        ];
        args.extend(pathspec(excludes));
        Ok(parse_paths(&self.git(args).await?))
    }

    /// Staged files and the staged diff in one call.
    pub async fn staged(&self, excludes: &[String]) -> Result<StagedChanges, GitError> {
        let files = self.staged_files(excludes).await?;
        if files.is_empty() {
            return Ok(StagedChanges::default());
        }
        let diff = self.diff(excludes).await?;
        Ok(StagedChanges { files, diff })
    }

    /// Tracked files with unstaged modifications.
    pub async fn not_staged_files(&self, excludes: &[String]) -> Result<Vec<String>, GitError> {
        let mut args = vec!["diff".to_string(), "--name-only".into(), "-z".into()];
        args.extend(pathspec(excludes));
        Ok(parse_paths(&self.git(args).await?))
    }

    /// Untracked files, honouring `.gitignore`.
    pub async fn untracked_files(&self, excludes: &[String]) -> Result<Vec<String>, GitError> {
        let mut args = vec![
            "ls-files".to_string(),
            "--others".into(),
            "--exclude-standard".into(),
            "-z".into(),
        ];
        args.extend(pathspec(excludes));
        Ok(parse_paths(&self.git(args).await?))
    }

    /// All three categories, made disjoint.
    pub async fn file_sets(&self, excludes: &[String]) -> Result<FileSets, GitError> {
        Ok(FileSets::new(
            self.staged_files(excludes).await?,
            self.not_staged_files(excludes).await?,
            self.untracked_files(excludes).await?,
        ))
    }

    /// The staged diff.
    pub async fn diff(&self, excludes: &[String]) -> Result<String, GitError> {
        let mut args = vec![
            "diff".to_string(),
            "--cached".into(),
            "--diff-algorithm=minimal".into(),
        ];
        args.extend(pathspec(excludes));
        self.git(args).await
    }

    /// The diff of tracked, unstaged changes.
    pub async fn unstaged_diff(&self, excludes: &[String]) -> Result<String, GitError> {
        let mut args = vec!["diff".to_string(), "--diff-algorithm=minimal".into()];
        args.extend(pathspec(excludes));
        self.git(args).await
    }

    pub async fn stage_all(&self) -> Result<(), GitError> {
        self.git(["add", "."]).await.map(drop)
    }

    pub async fn stage(&self, paths: &[String]) -> Result<(), GitError> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add".to_string(), "--".into()];
        args.extend(paths.iter().cloned());
        self.git(args).await.map(drop)
    }

    pub async fn commit(&self, message: &str) -> Result<(), GitError> {
        self.git(["commit", "-m", message]).await.map(drop)
    }

    pub async fn current_branch(&self) -> Result<String, GitError> {
        let out = self.git(["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        Ok(out.trim().to_string())
    }

    /// Branch that `origin/HEAD` points at.
    ///
    /// Returns `Ok(None)` when the ref is missing or not symbolic (git exits
    /// with 1 under `--quiet`); other failures are errors.
    pub async fn default_branch(&self) -> Result<Option<String>, GitError> {
        match self.git(["symbolic-ref", "--quiet", ORIGIN_HEAD]).await {
            Ok(out) => Ok(parse_default_branch(&out)),
            Err(e) if e.exit_code() == Some(1) => {
                debug!("{} is not set; skipping default-branch check", ORIGIN_HEAD);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn create_and_checkout_branch(&self, name: &str) -> Result<(), GitError> {
        self.git(["checkout", "-b", name]).await.map(drop)
    }
}

/// Pathspec arguments restricting a query to everything except `excludes`.
fn pathspec(excludes: &[String]) -> Vec<String> {
    if excludes.is_empty() {
        return Vec::new();
    }
    let mut args = vec!["--".to_string(), ".".to_string()];
    args.extend(excludes.iter().map(|e| format!(":(exclude){e}")));
    args
}

/// Splits NUL-terminated `-z` output. Paths are kept verbatim, unquoted.
fn parse_paths(stdout: &str) -> Vec<String> {
    stdout
        .split('\0')
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

fn parse_default_branch(symbolic_ref: &str) -> Option<String> {
    let trimmed = symbolic_ref.trim();
    let branch = trimmed
        .strip_prefix(ORIGIN_PREFIX)
        .or_else(|| trimmed.rsplit('/').next())?;
    (!branch.is_empty()).then(|| branch.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn expect_call(mock: &mut MockGitRunner, expected: Vec<String>, stdout: &'static str) {
        mock.expect_run()
            .withf(move |a| *a == expected)
            .times(1)
            .returning(move |_| Ok(stdout.to_string()));
    }

    #[test]
    fn test_pathspec_empty_excludes() {
        assert!(pathspec(&[]).is_empty());
    }

    #[test]
    fn test_pathspec_with_excludes() {
        let excludes = vec!["Cargo.lock".to_string(), "*.snap".to_string()];
        assert_eq!(
            pathspec(&excludes),
            args(&["--", ".", ":(exclude)Cargo.lock", ":(exclude)*.snap"])
        );
    }

    #[test]
    fn test_parse_paths_splits_on_nul() {
        assert_eq!(
            parse_paths("a.rs\0 b c.rs\0メモ.txt\0"),
            args(&["a.rs", " b c.rs", "メモ.txt"])
        );
        assert_eq!(parse_paths("odd\nname\0"), args(&["odd\nname"]));
        assert!(parse_paths("").is_empty());
    }

    #[test]
    fn test_parse_default_branch() {
        assert_eq!(
            parse_default_branch("refs/remotes/origin/main\n").as_deref(),
            Some("main")
        );
        assert_eq!(
            parse_default_branch("refs/remotes/origin/release/2.x").as_deref(),
            Some("release/2.x")
        );
        assert_eq!(parse_default_branch(""), None);
    }

    #[tokio::test]
    async fn test_staged_files_passes_excludes() {
        let mut mock = MockGitRunner::new();
        expect_call(
            &mut mock,
            args(&[
                "diff",
                "--cached",
                "--name-only",
                "-z",
                "--",
                ".",
                ":(exclude)dist",
            ]),
            "src/lib.rs\0src/main.rs\0",
        );

        let files = Git::new(mock)
            .staged_files(&["dist".to_string()])
            .await
            .unwrap();
        assert_eq!(files, args(&["src/lib.rs", "src/main.rs"]));
    }

    #[tokio::test]
    async fn test_staged_skips_diff_when_nothing_staged() {
        let mut mock = MockGitRunner::new();
        expect_call(&mut mock, args(&["diff", "--cached", "--name-only", "-z"]), "");

        let staged = Git::new(mock).staged(&[]).await.unwrap();
        assert_eq!(staged, StagedChanges::default());
    }

    #[tokio::test]
    async fn test_staged_collects_diff() {
        let mut mock = MockGitRunner::new();
        expect_call(&mut mock, args(&["diff", "--cached", "--name-only", "-z"]), "a.ts\0");
        expect_call(
            &mut mock,
            args(&["diff", "--cached", "--diff-algorithm=minimal"]),
            "sample diff",
        );

        let staged = Git::new(mock).staged(&[]).await.unwrap();
        assert_eq!(staged.files, args(&["a.ts"]));
        assert_eq!(staged.diff, "sample diff");
    }

    #[tokio::test]
    async fn test_untracked_files_uses_exclude_standard() {
        let mut mock = MockGitRunner::new();
        expect_call(
            &mut mock,
            args(&["ls-files", "--others", "--exclude-standard", "-z"]),
            "new.txt\0",
        );

        let files = Git::new(mock).untracked_files(&[]).await.unwrap();
        assert_eq!(files, args(&["new.txt"]));
    }

    #[tokio::test]
    async fn test_stage_paths() {
        let mut mock = MockGitRunner::new();
        expect_call(&mut mock, args(&["add", "--", "a.rs", "b c.rs"]), "");

        Git::new(mock)
            .stage(&args(&["a.rs", "b c.rs"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stage_nothing_is_noop() {
        let mock = MockGitRunner::new();
        Git::new(mock).stage(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_stage_all() {
        let mut mock = MockGitRunner::new();
        expect_call(&mut mock, args(&["add", "."]), "");
        Git::new(mock).stage_all().await.unwrap();
    }

    #[tokio::test]
    async fn test_commit_passes_message_verbatim() {
        let mut mock = MockGitRunner::new();
        expect_call(
            &mut mock,
            args(&["commit", "-m", "feat(cli): add \"quoted\" flag"]),
            "",
        );

        Git::new(mock)
            .commit("feat(cli): add \"quoted\" flag")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_current_branch_trims_output() {
        let mut mock = MockGitRunner::new();
        expect_call(&mut mock, args(&["rev-parse", "--abbrev-ref", "HEAD"]), "main\n");

        assert_eq!(Git::new(mock).current_branch().await.unwrap(), "main");
    }

    #[tokio::test]
    async fn test_default_branch_missing_origin_head() {
        let mut mock = MockGitRunner::new();
        mock.expect_run().times(1).returning(|a| {
            Err(GitError::CommandFailed {
                command: a.join(" "),
                code: 1,
                stderr: String::new(),
            })
        });

        assert_eq!(Git::new(mock).default_branch().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_default_branch_fatal_error_propagates() {
        let mut mock = MockGitRunner::new();
        mock.expect_run().times(1).returning(|a| {
            Err(GitError::CommandFailed {
                command: a.join(" "),
                code: 128,
                stderr: "fatal: not a git repository".to_string(),
            })
        });

        let err = Git::new(mock).default_branch().await.unwrap_err();
        assert_eq!(err.exit_code(), Some(128));
    }

    #[tokio::test]
    async fn test_create_and_checkout_branch() {
        let mut mock = MockGitRunner::new();
        expect_call(&mut mock, args(&["checkout", "-b", "feat/login"]), "");
        Git::new(mock)
            .create_and_checkout_branch("feat/login")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_file_sets_dedupes_across_queries() {
        let mut mock = MockGitRunner::new();
        expect_call(&mut mock, args(&["diff", "--cached", "--name-only", "-z"]), "a.rs\0");
        expect_call(&mut mock, args(&["diff", "--name-only", "-z"]), "a.rs\0b.rs\0");
        expect_call(
            &mut mock,
            args(&["ls-files", "--others", "--exclude-standard", "-z"]),
            "c.rs\0",
        );

        let sets = Git::new(mock).file_sets(&[]).await.unwrap();
        assert_eq!(sets.staged, args(&["a.rs"]));
        assert_eq!(sets.not_staged, args(&["b.rs"]));
        assert_eq!(sets.untracked, args(&["c.rs"]));
    }
}
