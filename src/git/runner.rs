//! Spawning the system `git` binary.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::GitError;

/// Trait for executing git commands.
///
/// This abstraction allows mocking the git subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitRunner: Send + Sync {
    /// Run git with `args` and return its stdout.
    async fn run(&self, args: Vec<String>) -> Result<String, GitError>;
}

/// Runner that calls the real git executable.
#[derive(Debug, Clone, Default)]
pub struct SystemGit {
    workdir: Option<PathBuf>,
}

impl SystemGit {
    /// Run git in the process's current directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run git inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: Some(dir.into()),
        }
    }

    /// Check that git is installed and on PATH.
    pub fn check_installed() -> Result<(), GitError> {
        which::which("git")
            .map(|_| ())
            .map_err(|_| GitError::NotInstalled)
    }
}

#[async_trait]
impl GitRunner for SystemGit {
    async fn run(&self, args: Vec<String>) -> Result<String, GitError> {
        let mut cmd = Command::new("git");
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GitError::NotInstalled
            } else {
                GitError::SpawnFailed(e)
            }
        })?;

        let code = output.status.code().unwrap_or(-1);
        debug!("git {} -> exit {}", args.join(" "), code);

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_git_version_succeeds() {
        let output = SystemGit::new()
            .run(vec!["--version".to_string()])
            .await
            .unwrap();
        assert!(output.starts_with("git version"));
    }

    #[tokio::test]
    async fn test_invalid_command_reports_exit_code_and_stderr() {
        let err = SystemGit::new()
            .run(vec!["not-a-real-command".to_string()])
            .await
            .unwrap_err();

        match err {
            GitError::CommandFailed { command, code, stderr } => {
                assert_eq!(command, "not-a-real-command");
                assert_ne!(code, 0);
                assert!(stderr.contains("not-a-real-command"));
            }
            other => panic!("Expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = SystemGit::in_dir(dir.path())
            .run(vec!["rev-parse".into(), "--abbrev-ref".into(), "HEAD".into()])
            .await;
        assert!(matches!(result, Err(GitError::CommandFailed { .. })));
    }

    #[test]
    fn test_check_installed() {
        assert!(SystemGit::check_installed().is_ok());
    }
}
