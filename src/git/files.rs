//! The three disjoint file categories observed in the working tree.

use std::collections::HashSet;

/// A changed file the user may choose to stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkedFile {
    pub path: String,
    pub untracked: bool,
}

/// Staged, tracked-but-unstaged, and untracked paths.
///
/// Construction enforces disjointness: a path staged and also modified again
/// in the working tree counts as staged only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSets {
    pub staged: Vec<String>,
    pub not_staged: Vec<String>,
    pub untracked: Vec<String>,
}

impl FileSets {
    pub fn new(staged: Vec<String>, not_staged: Vec<String>, untracked: Vec<String>) -> Self {
        let mut seen = HashSet::new();
        let staged = keep_unseen(staged, &mut seen);
        let not_staged = keep_unseen(not_staged, &mut seen);
        let untracked = keep_unseen(untracked, &mut seen);

        Self {
            staged,
            not_staged,
            untracked,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty() && self.not_staged.is_empty() && self.untracked.is_empty()
    }

    /// Unstaged and untracked files, sorted alphabetically (case-insensitive).
    pub fn worked_files(&self) -> Vec<WorkedFile> {
        let mut files: Vec<WorkedFile> = self
            .not_staged
            .iter()
            .map(|path| WorkedFile {
                path: path.clone(),
                untracked: false,
            })
            .chain(self.untracked.iter().map(|path| WorkedFile {
                path: path.clone(),
                untracked: true,
            }))
            .collect();

        files.sort_by(|a, b| {
            a.path
                .to_lowercase()
                .cmp(&b.path.to_lowercase())
                .then_with(|| a.path.cmp(&b.path))
        });
        files
    }
}

fn keep_unseen(paths: Vec<String>, seen: &mut HashSet<String>) -> Vec<String> {
    paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
