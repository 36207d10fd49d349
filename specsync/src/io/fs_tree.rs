//! Filesystem helpers: recursive tree copy and glob listing.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use tracing::{debug, instrument};

/// Summary of a completed tree copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopySummary {
    pub files_copied: usize,
}

/// Recursively copy `source` over `dest`, creating directories as needed.
///
/// Existing files are overwritten; files present only in `dest` are left
/// alone. The git diff decides what actually changed.
#[instrument(skip_all, fields(source = %source.display(), dest = %dest.display()))]
pub fn copy_tree(source: &Path, dest: &Path) -> Result<CopySummary> {
    let mut files_copied = 0usize;
    let mut pending = vec![source.to_path_buf()];
    while let Some(current) = pending.pop() {
        let rel = current
            .strip_prefix(source)
            .with_context(|| format!("walk escaped {}", source.display()))?;
        let target = dest.join(rel);
        fs::create_dir_all(&target)
            .with_context(|| format!("create directory {}", target.display()))?;

        let entries = fs::read_dir(&current)
            .with_context(|| format!("read directory {}", current.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("read entry in {}", current.display()))?;
            let ty = entry
                .file_type()
                .with_context(|| format!("stat {}", entry.path().display()))?;
            if ty.is_dir() {
                pending.push(entry.path());
                continue;
            }
            let from = entry.path();
            let rel = from
                .strip_prefix(source)
                .with_context(|| format!("walk escaped {}", source.display()))?;
            let to = dest.join(rel);
            fs::copy(&from, &to)
                .with_context(|| format!("copy {} to {}", from.display(), to.display()))?;
            files_copied += 1;
        }
    }
    debug!(files_copied, "tree copy complete");
    Ok(CopySummary { files_copied })
}

/// List files under `root` whose root-relative path matches `pattern`.
///
/// Paths use forward slashes and are sorted for deterministic staging
/// order. The `.git` directory is never descended into.
pub fn matching_files(root: &Path, pattern: &str) -> Result<Vec<String>> {
    let matcher = compile_pattern(pattern)?;
    let mut matches = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current)
            .with_context(|| format!("read directory {}", current.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("read entry in {}", current.display()))?;
            let ty = entry
                .file_type()
                .with_context(|| format!("stat {}", entry.path().display()))?;
            if ty.is_dir() {
                if entry.file_name() == ".git" {
                    continue;
                }
                pending.push(entry.path());
                continue;
            }
            let path = entry.path();
            let rel = path
                .strip_prefix(root)
                .with_context(|| format!("walk escaped {}", root.display()))?;
            let rel = rel.to_string_lossy().replace('\\', "/");
            if matcher.is_match(&rel) {
                matches.push(rel);
            }
        }
    }
    matches.sort();
    Ok(matches)
}

/// Compile a glob pattern with a config-friendly error message.
pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    let glob =
        Glob::new(pattern).with_context(|| format!("invalid glob pattern '{pattern}'"))?;
    Ok(glob.compile_matcher())
}
