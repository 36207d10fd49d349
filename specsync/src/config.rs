//! Sync configuration, optionally stored as `specsync.toml` in the checkout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::io::fs_tree::compile_pattern;

/// Tool configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to the standard fixture layout; the
/// source directory has no sensible default and must be supplied by the
/// file or the `--source` flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    /// Directory the fixtures are copied from. Must be absolute.
    pub source_dir: PathBuf,

    /// Git checkout receiving the copy. Must be absolute once resolved.
    pub target_dir: PathBuf,

    /// Checkout subtree the source tree is copied over.
    pub subtree: String,

    /// Glob for fixture data files, relative to the checkout root.
    pub fixture_pattern: String,

    /// Glob for specification files, relative to the checkout root.
    pub spec_pattern: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            target_dir: PathBuf::from("."),
            subtree: "spec".to_string(),
            fixture_pattern: "spec/fixtures.*".to_string(),
            spec_pattern: "spec/spec.*".to_string(),
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<()> {
        if self.source_dir.as_os_str().is_empty() {
            return Err(anyhow!(
                "source_dir must be set (--source flag or specsync.toml)"
            ));
        }
        if !self.source_dir.is_absolute() {
            return Err(anyhow!(
                "source_dir must be absolute: {}",
                self.source_dir.display()
            ));
        }
        if !self.target_dir.is_absolute() {
            return Err(anyhow!(
                "target_dir must be absolute: {}",
                self.target_dir.display()
            ));
        }
        if self.subtree.trim().is_empty() || self.subtree.contains("..") {
            return Err(anyhow!(
                "subtree must be a plain directory name inside the checkout"
            ));
        }
        compile_pattern(&self.fixture_pattern)?;
        compile_pattern(&self.spec_pattern)?;
        Ok(())
    }

    /// Destination of the copy: `<target_dir>/<subtree>`.
    pub fn subtree_dir(&self) -> PathBuf {
        self.target_dir.join(&self.subtree)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SyncConfig::default()`. Validation
/// happens after CLI overrides are applied, not here.
pub fn load_config(path: &Path) -> Result<SyncConfig> {
    if !path.exists() {
        return Ok(SyncConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SyncConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
