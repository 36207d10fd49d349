//! Orchestration of the guarded sync workflow.
//!
//! The workflow is linear: verify the source directory, verify the checkout
//! is clean, pull, copy the fixture tree, verify the copy changed something,
//! commit fixture and specification files separately, push. The first three
//! guards abort the run before any further side effect; every later failure
//! is fatal as-is (no rollback — earlier commits stay in place for manual
//! recovery). Aborts surface as [`SyncAbort`] so the binary can map them to
//! stable exit codes.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::config::SyncConfig;
use crate::io::env::Environment;
use crate::io::git::StatusEntry;
use crate::report::Reporter;

/// Commit message for fixture data changes.
pub const FIXTURES_COMMIT_MESSAGE: &str = "Update fixture data";
/// Commit message for specification changes.
pub const SPEC_COMMIT_MESSAGE: &str = "Update OpenAPI specification";

/// Why a run stopped before completing the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAbort {
    /// The configured source directory does not exist.
    MissingSource { path: PathBuf },
    /// The checkout had uncommitted changes before the sync.
    DirtyTarget {
        path: PathBuf,
        entries: Vec<StatusEntry>,
    },
    /// The copy produced no diff; there is nothing to commit.
    NoChanges,
}

impl fmt::Display for SyncAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAbort::MissingSource { path } => {
                write!(f, "source directory missing: {}", path.display())
            }
            SyncAbort::DirtyTarget { path, entries } => {
                write!(
                    f,
                    "target repository has uncommitted changes: {}",
                    path.display()
                )?;
                for entry in entries {
                    write!(f, "\n  {} {}", entry.code, entry.path)?;
                }
                Ok(())
            }
            SyncAbort::NoChanges => write!(f, "no changes to commit"),
        }
    }
}

impl std::error::Error for SyncAbort {}

/// Whether a commit category produced a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// Nothing ended up staged for this category; the commit was skipped.
    Skipped,
}

/// Summary of a completed sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub files_copied: usize,
    pub fixtures: CommitOutcome,
    pub spec: CommitOutcome,
}

/// Check the two entry guards: source directory present, checkout clean.
///
/// Shared between the sync workflow and `specsync check`.
pub(crate) fn ensure_preconditions<E: Environment>(env: &E, config: &SyncConfig) -> Result<()> {
    if !env.dir_exists(&config.source_dir) {
        return Err(SyncAbort::MissingSource {
            path: config.source_dir.clone(),
        }
        .into());
    }
    if !env.repo_is_clean().context("check worktree status")? {
        let entries = env.dirty_entries().context("list uncommitted changes")?;
        return Err(SyncAbort::DirtyTarget {
            path: config.target_dir.clone(),
            entries,
        }
        .into());
    }
    Ok(())
}

/// Run the full workflow against `env`, reporting each step to `reporter`.
///
/// Aborts (the three precondition failures) and external-command failures
/// both surface as errors; callers distinguish aborts by downcasting to
/// [`SyncAbort`].
#[instrument(skip_all)]
pub fn run_sync<E: Environment, R: Reporter>(
    env: &E,
    config: &SyncConfig,
    reporter: &mut R,
) -> Result<SyncOutcome> {
    config.validate()?;
    ensure_preconditions(env, config)?;

    reporter.step("Pulling latest changes");
    let pull_output = env.pull().context("pull target repository")?;
    reporter.detail(&pull_output);

    let dest = config.subtree_dir();
    reporter.step(&format!(
        "Copying {} into {}",
        config.source_dir.display(),
        dest.display()
    ));
    let copied = env
        .copy_tree(&config.source_dir, &dest)
        .context("copy fixture tree")?;
    reporter.detail(&format!("{} files copied", copied.files_copied));

    // The copy overwrites in place; only the git status says whether it
    // actually changed anything.
    if env
        .repo_is_clean()
        .context("check worktree status after copy")?
    {
        return Err(SyncAbort::NoChanges.into());
    }

    let fixtures = commit_category(
        env,
        reporter,
        &config.fixture_pattern,
        FIXTURES_COMMIT_MESSAGE,
        "fixture data",
    )?;
    let spec = commit_category(
        env,
        reporter,
        &config.spec_pattern,
        SPEC_COMMIT_MESSAGE,
        "specification",
    )?;

    reporter.step("Pushing to remote");
    let push_output = env.push().context("push target repository")?;
    reporter.detail(&push_output);

    info!(files_copied = copied.files_copied, "sync complete");
    Ok(SyncOutcome {
        files_copied: copied.files_copied,
        fixtures,
        spec,
    })
}

/// Stage files matching `pattern` and commit them if anything is staged.
///
/// The glob may match tracked files with no diff, so the staged check — not
/// the match list — decides whether a commit happens.
fn commit_category<E: Environment, R: Reporter>(
    env: &E,
    reporter: &mut R,
    pattern: &str,
    message: &str,
    label: &str,
) -> Result<CommitOutcome> {
    let matches = env
        .matching_files(pattern)
        .with_context(|| format!("list files matching '{pattern}'"))?;
    debug!(pattern, matches = matches.len(), "glob matches");
    if !matches.is_empty() {
        env.stage(&matches)
            .with_context(|| format!("stage files matching '{pattern}'"))?;
    }
    if !env.has_staged_changes().context("check staged changes")? {
        reporter.step(&format!("No {label} changes, skipping commit"));
        return Ok(CommitOutcome::Skipped);
    }
    reporter.step(&format!("Committing {label} changes"));
    let output = env
        .commit(message)
        .with_context(|| format!("commit {label} changes"))?;
    reporter.detail(&output);
    Ok(CommitOutcome::Committed)
}
