//! Environment gateway for the sync workflow.
//!
//! The [`Environment`] trait decouples the synchronizer from the filesystem
//! and the `git` CLI. The real implementation shells out; tests use scripted
//! environments that answer from fixtures without touching a repository.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::io::fs_tree::{self, CopySummary};
use crate::io::git::{Git, StatusEntry};

/// Primitive operations the synchronizer is built from.
///
/// Every operation that shells out surfaces a non-zero exit as an `Err`,
/// which the synchronizer treats as fatal.
pub trait Environment {
    /// True if `path` exists and is a directory.
    fn dir_exists(&self, path: &Path) -> bool;

    /// True if the checkout has no uncommitted or untracked changes.
    fn repo_is_clean(&self) -> Result<bool>;

    /// Status entries for everything uncommitted in the checkout.
    fn dirty_entries(&self) -> Result<Vec<StatusEntry>>;

    /// Pull from the remote; returns the tool output for the log.
    fn pull(&self) -> Result<String>;

    /// Copy `source` recursively over `dest`.
    fn copy_tree(&self, source: &Path, dest: &Path) -> Result<CopySummary>;

    /// Checkout-relative paths of files matching `pattern`.
    fn matching_files(&self, pattern: &str) -> Result<Vec<String>>;

    /// Stage the given checkout-relative paths.
    fn stage(&self, paths: &[String]) -> Result<()>;

    /// True if anything is staged for commit.
    fn has_staged_changes(&self) -> Result<bool>;

    /// Commit staged changes; returns the tool output for the log.
    fn commit(&self, message: &str) -> Result<String>;

    /// Push to the remote; returns the tool output for the log.
    fn push(&self) -> Result<String>;
}

/// Real environment: `std::fs` for copies, the `git` CLI for the rest.
#[derive(Debug, Clone)]
pub struct ShellEnvironment {
    git: Git,
}

impl ShellEnvironment {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            git: Git::new(target_dir),
        }
    }

    pub fn target_dir(&self) -> &Path {
        self.git.workdir()
    }
}

impl Environment for ShellEnvironment {
    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn repo_is_clean(&self) -> Result<bool> {
        self.git.is_clean()
    }

    fn dirty_entries(&self) -> Result<Vec<StatusEntry>> {
        self.git.status_porcelain()
    }

    fn pull(&self) -> Result<String> {
        self.git.pull()
    }

    fn copy_tree(&self, source: &Path, dest: &Path) -> Result<CopySummary> {
        fs_tree::copy_tree(source, dest)
    }

    fn matching_files(&self, pattern: &str) -> Result<Vec<String>> {
        fs_tree::matching_files(self.git.workdir(), pattern)
    }

    fn stage(&self, paths: &[String]) -> Result<()> {
        self.git.add_paths(paths)
    }

    fn has_staged_changes(&self) -> Result<bool> {
        self.git.has_staged_changes()
    }

    fn commit(&self, message: &str) -> Result<String> {
        self.git.commit(message)
    }

    fn push(&self) -> Result<String> {
        self.git.push()
    }
}
