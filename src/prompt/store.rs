//! The stored template overrides (`prompt`, `branch-prompt`).

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::TemplateError;

use super::templates::TemplateKind;

const FALLBACK_EDITOR: &str = "vim";

/// Template files inside the config directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, kind: TemplateKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// The stored template, or the built-in default. Never writes.
    pub fn load(&self, kind: TemplateKind) -> Result<String, TemplateError> {
        if !self.exists(kind) {
            return Ok(kind.default_template().to_string());
        }
        let path = self.path(kind);
        debug!("Using stored template {}", path.display());
        read(&path)
    }

    /// The stored template, writing the default first if none exists.
    pub fn get(&self, kind: TemplateKind) -> Result<String, TemplateError> {
        let path = self.ensure(kind)?;
        read(&path)
    }

    /// Make sure the template file exists, creating it with the default.
    pub fn ensure(&self, kind: TemplateKind) -> Result<PathBuf, TemplateError> {
        if !self.exists(kind) {
            self.write(kind, kind.default_template())?;
        }
        Ok(self.path(kind))
    }

    /// Whether a stored override exists.
    pub fn exists(&self, kind: TemplateKind) -> bool {
        self.path(kind).exists()
    }

    /// Overwrite the stored template with the built-in default.
    pub fn reset(&self, kind: TemplateKind) -> Result<&'static str, TemplateError> {
        let default = kind.default_template();
        self.write(kind, default)?;
        Ok(default)
    }

    /// Open the stored template in the user's editor and return the result.
    pub fn edit(&self, kind: TemplateKind) -> Result<String, TemplateError> {
        let path = self.ensure(kind)?;
        let editor = resolve_editor()?;
        run_editor(&editor, &path)?;
        read(&path)
    }

    fn write(&self, kind: TemplateKind, content: &str) -> Result<(), TemplateError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| TemplateError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path(kind);
        std::fs::write(&path, content).map_err(|source| TemplateError::Write { path, source })
    }
}

fn read(path: &Path) -> Result<String, TemplateError> {
    std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Pick `$VISUAL`, then `$EDITOR`, then vim, keeping the first one on PATH.
pub fn resolve_editor() -> Result<String, TemplateError> {
    let candidates = ["VISUAL", "EDITOR"]
        .into_iter()
        .filter_map(|var| env::var(var).ok())
        .filter(|v| !v.trim().is_empty())
        .chain(std::iter::once(FALLBACK_EDITOR.to_string()));

    for candidate in candidates {
        let program = candidate.split_whitespace().next().unwrap_or_default();
        if which::which(program).is_ok() {
            return Ok(candidate);
        }
        debug!("Editor '{}' not found on PATH", program);
    }

    Err(TemplateError::EditorNotFound)
}

/// Run `editor` (which may carry arguments, e.g. `code --wait`) on `path`.
fn run_editor(editor: &str, path: &Path) -> Result<(), TemplateError> {
    let mut parts = editor.split_whitespace();
    let program = parts.next().ok_or(TemplateError::EditorNotFound)?;

    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|source| TemplateError::EditorSpawn {
            editor: editor.to_string(),
            source,
        })?;

    if !status.success() {
        return Err(TemplateError::EditorFailed {
            editor: editor.to_string(),
            code: status.code().unwrap_or(-1),
        });
    }

    Ok(())
}
