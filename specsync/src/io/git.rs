//! Git adapter for the sync workflow.
//!
//! The synchronizer guards on repository cleanliness and commits
//! deterministically, so we keep a small, explicit wrapper around `git`
//! subprocess calls.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

/// Parsed `git status --porcelain` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// 2-letter XY code, or "??" for untracked.
    pub code: String,
    /// Path for the changed file.
    pub path: String,
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Get status entries (including untracked) in porcelain format.
    pub fn status_porcelain(&self) -> Result<Vec<StatusEntry>> {
        let out = self.run_capture(&["status", "--porcelain=v1", "-uall"])?;
        let mut entries = Vec::new();
        for line in out.lines() {
            if line.trim().is_empty() {
                continue;
            }
            entries.push(parse_status_line(line)?);
        }
        Ok(entries)
    }

    /// True if the working tree has no uncommitted or untracked changes.
    #[instrument(skip_all)]
    pub fn is_clean(&self) -> Result<bool> {
        let entries = self.status_porcelain()?;
        debug!(entries = entries.len(), "worktree status");
        Ok(entries.is_empty())
    }

    /// Pull from the configured remote, returning the tool's output.
    ///
    /// Git writes pull progress to stderr and the merge summary to stdout,
    /// so both streams are surfaced.
    #[instrument(skip_all)]
    pub fn pull(&self) -> Result<String> {
        debug!("pulling from remote");
        self.run_surfaced(&["pull"])
    }

    /// Push to the configured remote, returning the tool's output.
    #[instrument(skip_all)]
    pub fn push(&self) -> Result<String> {
        debug!("pushing to remote");
        self.run_surfaced(&["push"])
    }

    /// Stage the given pathspecs (relative to the workdir).
    pub fn add_paths(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_checked(&args)?;
        Ok(())
    }

    /// True if there is anything staged for commit.
    pub fn has_staged_changes(&self) -> Result<bool> {
        let out = self.run(&["diff", "--cached", "--name-only"])?;
        Ok(!String::from_utf8_lossy(&out.stdout).trim().is_empty())
    }

    /// Commit staged changes with a message, returning the tool's output.
    ///
    /// The caller decides whether anything is staged; committing with an
    /// empty index is a git error and propagates as one.
    #[instrument(skip_all)]
    pub fn commit(&self, message: &str) -> Result<String> {
        debug!("committing staged changes");
        self.run_capture(&["commit", "-m", message])
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Like `run_capture`, but includes stderr in the returned text. Used
    /// for pull/push, where git reports progress on stderr.
    fn run_surfaced(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(format!("{stdout}{stderr}"))
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "git {} failed (status {}): {}",
                args.join(" "),
                output.status,
                stderr.trim()
            ));
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .with_context(|| format!("spawn git {}", args.join(" ")))
    }
}

fn parse_status_line(line: &str) -> Result<StatusEntry> {
    if let Some(path) = line.strip_prefix("?? ") {
        return Ok(StatusEntry {
            code: "??".to_string(),
            path: path.trim().to_string(),
        });
    }
    if line.len() < 4 {
        return Err(anyhow!("unexpected porcelain line: '{line}'"));
    }
    let code = line[..2].to_string();
    let mut path = line[3..].trim().to_string();
    if let Some((_, new)) = path.split_once("->") {
        path = new.trim().to_string();
    }
    Ok(StatusEntry { code, path })
}
