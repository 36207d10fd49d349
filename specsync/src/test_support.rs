//! Test-only helpers: real git fixtures and scripted environments.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::config::SyncConfig;
use crate::io::env::Environment;
use crate::io::fs_tree::CopySummary;
use crate::io::git::StatusEntry;
use crate::report::Reporter;

/// A throwaway sync fixture: bare origin, checkout pushed to it, source dir.
///
/// The checkout starts with a committed `spec/` subtree (`fixtures.json`,
/// `spec.yaml`) pushed to origin with upstream tracking, so both pull and
/// push work. The source directory holds the same content; tests mutate it
/// to produce diffs.
pub struct TestRepo {
    _temp: TempDir,
    origin: PathBuf,
    checkout: PathBuf,
    source: PathBuf,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("create tempdir")?;
        let origin = temp.path().join("origin.git");
        let checkout = temp.path().join("checkout");
        let source = temp.path().join("fixtures");

        fs::create_dir_all(&origin).context("create origin dir")?;
        fs::create_dir_all(&checkout).context("create checkout dir")?;
        fs::create_dir_all(&source).context("create source dir")?;

        git(&origin, &["init", "--bare", "--initial-branch=main"])?;

        git(&checkout, &["init", "--initial-branch=main"])?;
        git(&checkout, &["config", "user.email", "sync@tests.invalid"])?;
        git(&checkout, &["config", "user.name", "specsync tests"])?;
        git(&checkout, &["config", "commit.gpgsign", "false"])?;
        git(&checkout, &["remote", "add", "origin", "../origin.git"])?;

        fs::create_dir_all(checkout.join("spec")).context("create spec subtree")?;
        fs::write(checkout.join("spec/fixtures.json"), "{\"seed\":1}\n")
            .context("write fixtures.json")?;
        fs::write(checkout.join("spec/spec.yaml"), "openapi: 3.0.0\n")
            .context("write spec.yaml")?;
        git(&checkout, &["add", "-A"])?;
        git(&checkout, &["commit", "-m", "Initial fixtures"])?;
        git(&checkout, &["push", "-u", "origin", "main"])?;

        fs::write(source.join("fixtures.json"), "{\"seed\":1}\n")
            .context("write source fixtures.json")?;
        fs::write(source.join("spec.yaml"), "openapi: 3.0.0\n")
            .context("write source spec.yaml")?;

        Ok(Self {
            _temp: temp,
            origin,
            checkout,
            source,
        })
    }

    pub fn checkout(&self) -> &Path {
        &self.checkout
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// A resolved config pointing at this fixture's paths.
    pub fn config(&self) -> SyncConfig {
        SyncConfig {
            source_dir: self.source.clone(),
            target_dir: self.checkout.clone(),
            ..SyncConfig::default()
        }
    }

    /// Overwrite a file in the source fixture directory.
    pub fn write_source(&self, rel: &str, contents: &str) -> Result<()> {
        write_rel(&self.source, rel, contents)
    }

    /// Overwrite a file in the checkout (dirties the worktree).
    pub fn write_checkout(&self, rel: &str, contents: &str) -> Result<()> {
        write_rel(&self.checkout, rel, contents)
    }

    /// Commit subjects in the checkout, newest first.
    pub fn log_messages(&self) -> Result<Vec<String>> {
        let out = git(&self.checkout, &["log", "--pretty=%s"])?;
        Ok(out.lines().map(str::to_string).collect())
    }

    /// Commit subjects on origin's main branch, newest first.
    pub fn origin_log_messages(&self) -> Result<Vec<String>> {
        let out = git(&self.origin, &["log", "--pretty=%s", "main"])?;
        Ok(out.lines().map(str::to_string).collect())
    }
}

fn write_rel(root: &Path, rel: &str, contents: &str) -> Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn git(cwd: &Path, args: &[&str]) -> Result<String> {
    let out = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .with_context(|| format!("spawn git {}", args.join(" ")))?;
    if !out.status.success() {
        return Err(anyhow!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&out.stderr).trim()
        ));
    }
    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

/// Reporter that records lines for assertions.
#[derive(Debug, Default)]
pub struct BufferReporter {
    pub lines: Vec<String>,
}

impl Reporter for BufferReporter {
    fn step(&mut self, description: &str) {
        self.lines.push(format!("--> {description}"));
    }

    fn detail(&mut self, text: &str) {
        let trimmed = text.trim_end();
        if !trimmed.is_empty() {
            self.lines.push(trimmed.to_string());
        }
    }
}

/// Scripted [`Environment`] that records the operations performed.
///
/// Answers come from scripted queues and maps; mutating operations only
/// append to the call log. Log entries name the operation (commits include
/// the message) so tests can assert ordering and absence.
pub struct ScriptedEnvironment {
    pub source_exists: bool,
    clean_answers: RefCell<VecDeque<bool>>,
    staged_answers: RefCell<VecDeque<bool>>,
    matches: RefCell<HashMap<String, Vec<String>>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedEnvironment {
    pub fn new() -> Self {
        Self {
            source_exists: true,
            clean_answers: RefCell::new(VecDeque::new()),
            staged_answers: RefCell::new(VecDeque::new()),
            matches: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Environment whose source directory does not exist.
    pub fn without_source() -> Self {
        Self {
            source_exists: false,
            ..Self::new()
        }
    }

    /// Queue answers for successive `repo_is_clean` calls
    /// (pre-sync check, then post-copy check).
    pub fn script_clean(&self, answers: &[bool]) {
        self.clean_answers.borrow_mut().extend(answers.iter().copied());
    }

    /// Queue answers for successive `has_staged_changes` calls
    /// (fixture category, then specification category).
    pub fn script_staged(&self, answers: &[bool]) {
        self.staged_answers
            .borrow_mut()
            .extend(answers.iter().copied());
    }

    /// Fix the match list returned for a glob pattern.
    pub fn script_matches(&self, pattern: &str, files: &[&str]) {
        self.matches.borrow_mut().insert(
            pattern.to_string(),
            files.iter().map(|f| f.to_string()).collect(),
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

impl Default for ScriptedEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for ScriptedEnvironment {
    fn dir_exists(&self, _path: &Path) -> bool {
        self.record("dir_exists");
        self.source_exists
    }

    fn repo_is_clean(&self) -> Result<bool> {
        self.record("repo_is_clean");
        self.clean_answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("unscripted repo_is_clean call"))
    }

    fn dirty_entries(&self) -> Result<Vec<StatusEntry>> {
        self.record("dirty_entries");
        Ok(vec![StatusEntry {
            code: " M".to_string(),
            path: "spec/spec.yaml".to_string(),
        }])
    }

    fn pull(&self) -> Result<String> {
        self.record("pull");
        Ok("Already up to date.\n".to_string())
    }

    fn copy_tree(&self, _source: &Path, _dest: &Path) -> Result<CopySummary> {
        self.record("copy_tree");
        Ok(CopySummary { files_copied: 2 })
    }

    fn matching_files(&self, pattern: &str) -> Result<Vec<String>> {
        self.record(format!("matching_files {pattern}"));
        Ok(self
            .matches
            .borrow()
            .get(pattern)
            .cloned()
            .unwrap_or_default())
    }

    fn stage(&self, paths: &[String]) -> Result<()> {
        self.record(format!("stage {}", paths.join(" ")));
        Ok(())
    }

    fn has_staged_changes(&self) -> Result<bool> {
        self.record("has_staged_changes");
        self.staged_answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("unscripted has_staged_changes call"))
    }

    fn commit(&self, message: &str) -> Result<String> {
        self.record(format!("commit {message}"));
        Ok(format!("[main] {message}\n"))
    }

    fn push(&self) -> Result<String> {
        self.record("push");
        Ok("To origin\n".to_string())
    }
}
