//! Error types for ai-commit modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading, validating, or updating the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{message}")]
    MissingRequired { key: String, message: String },

    #[error("Could not determine the user config directory. Set AI_COMMIT_CONFIG_DIR.")]
    NoConfigDir,

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown config key '{0}'. Valid keys: apiKey, locale, type, generate, model, maxLength, timeout, branchPolicy")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Expected KEY=VALUE, got '{0}'")]
    MalformedAssignment(String),
}

/// Errors from invoking the git executable.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git executable not found in PATH")]
    NotInstalled,

    #[error("Failed to spawn git: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("`git {command}` exited with code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },
}

impl GitError {
    /// Exit code of a failed git command, if the process ran.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            GitError::CommandFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Errors from the generative model call.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Gemini API Error: {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Request(String),

    #[error("Gemini request timed out after {0} ms")]
    Timeout(u64),

    #[error("Gemini returned an unreadable response: {0}")]
    InvalidResponse(String),

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<GenerateError>),
}

impl GenerateError {
    /// Whether the failure is worth another attempt (rate limit or server error).
    pub fn is_transient(&self) -> bool {
        match self {
            GenerateError::Api { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

/// Errors from the prompt template store.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write template {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No editor found. Set $VISUAL or $EDITOR, or install vim.")]
    EditorNotFound,

    #[error("Editor '{editor}' exited with code {code}")]
    EditorFailed { editor: String, code: i32 },

    #[error("Failed to launch editor '{editor}': {source}")]
    EditorSpawn {
        editor: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the interactive terminal session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Terminal interaction failed: {0}")]
    Terminal(String),
}

/// Errors from the commit command.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("No commit messages were generated. Try again.")]
    NoCommitMessages,

    #[error("No branch names were generated. Try again.")]
    NoBranchNames,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_has_gemini_prefix() {
        let err = GenerateError::Api {
            status: 400,
            message: "API key not valid".to_string(),
        };
        assert_eq!(err.to_string(), "Gemini API Error: API key not valid");
    }

    #[test]
    fn test_request_error_passes_message_through() {
        let err = GenerateError::Request("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn test_transient_classification() {
        let rate_limited = GenerateError::Api { status: 429, message: String::new() };
        let unavailable = GenerateError::Api { status: 503, message: String::new() };
        let bad_request = GenerateError::Api { status: 400, message: String::new() };

        assert!(rate_limited.is_transient());
        assert!(unavailable.is_transient());
        assert!(!bad_request.is_transient());
        assert!(!GenerateError::Timeout(10).is_transient());
    }

    #[test]
    fn test_git_error_exit_code() {
        let err = GitError::CommandFailed {
            command: "status".to_string(),
            code: 128,
            stderr: "fatal: not a git repository".to_string(),
        };
        assert_eq!(err.exit_code(), Some(128));
        assert!(err.to_string().contains("not a git repository"));
        assert_eq!(GitError::NotInstalled.exit_code(), None);
    }

    #[test]
    fn test_missing_required_displays_message() {
        let err = CommitError::from(ConfigError::MissingRequired {
            key: "apiKey".to_string(),
            message: "Please set your Gemini API key via `ai-commit config set apiKey=<your token>`"
                .to_string(),
        });
        assert!(err.to_string().contains("config set apiKey"));
    }
}
