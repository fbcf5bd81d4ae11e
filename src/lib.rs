//! ai-commit - A CLI tool that writes git commit messages and branch names
//! from your diff using Gemini.
//!
//! # Overview
//!
//! ai-commit reads the staged (or interactively selected) changes through the
//! git executable, renders an instruction template, asks Gemini for one or
//! more candidates, and lets you confirm or pick one before committing. When
//! you are on the remote's default branch it first proposes a new branch.

pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use commit::{CommitContext, CommitFlow, CommitOverrides, Outcome};
pub use config::{BranchPolicy, CommitType, Config, ConfigStore};
pub use error::{CommitError, ConfigError, GenerateError, GitError, SessionError, TemplateError};
pub use session::{Answer, Session};
