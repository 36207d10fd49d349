//! One-way sync of OpenAPI specification fixtures into a git checkout.
//!
//! # Usage
//!
//! ```text
//! specsync sync  [--source <dir>] [--repo <dir>] [--config <path>]
//! specsync check [--source <dir>] [--repo <dir>] [--config <path>]
//! ```
//!
//! `sync` pulls the checkout, copies the fixture tree over its `spec/`
//! subtree, commits fixture and specification changes separately, and
//! pushes. `check` runs only the entry guards. Exit codes are documented in
//! [`specsync::exit_codes`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use specsync::check::run_check;
use specsync::config::{SyncConfig, load_config};
use specsync::exit_codes;
use specsync::io::env::ShellEnvironment;
use specsync::logging;
use specsync::report::StdoutReporter;
use specsync::sync::{SyncAbort, run_sync};

#[derive(Parser)]
#[command(
    name = "specsync",
    version,
    about = "Sync specification fixtures into a git checkout"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pull, copy the fixture tree, commit per category, and push.
    Sync(CommonArgs),
    /// Run the entry guards (source present, checkout clean) without syncing.
    Check(CommonArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Directory to copy fixtures from (overrides the config file).
    #[arg(long)]
    source: Option<PathBuf>,

    /// Target git checkout (defaults to the current directory).
    #[arg(long)]
    repo: Option<PathBuf>,

    /// Config file path (defaults to `<repo>/specsync.toml`).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_code_for(&err));
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Sync(args) => cmd_sync(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SyncAbort>() {
        Some(SyncAbort::MissingSource { .. } | SyncAbort::DirtyTarget { .. }) => {
            exit_codes::PRECONDITION
        }
        Some(SyncAbort::NoChanges) => exit_codes::NO_CHANGES,
        None => exit_codes::INVALID,
    }
}

fn cmd_sync(args: CommonArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let env = ShellEnvironment::new(&config.target_dir);
    let mut reporter = StdoutReporter;
    run_sync(&env, &config, &mut reporter)?;
    Ok(())
}

fn cmd_check(args: CommonArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let env = ShellEnvironment::new(&config.target_dir);
    run_check(&env, &config)?;
    println!(
        "ready to sync: {} -> {}",
        config.source_dir.display(),
        config.target_dir.display()
    );
    Ok(())
}

/// Load the config file (if present) and apply CLI overrides.
///
/// Relative paths are resolved against the current directory before the
/// config's absolute-path validation runs.
fn resolve_config(args: &CommonArgs) -> Result<SyncConfig> {
    let cwd = std::env::current_dir().context("determine current directory")?;
    let repo_hint = args.repo.clone().unwrap_or_else(|| PathBuf::from("."));
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| repo_hint.join("specsync.toml"));

    let mut config = load_config(&config_path)?;
    if let Some(repo) = &args.repo {
        config.target_dir = repo.clone();
    }
    if let Some(source) = &args.source {
        config.source_dir = source.clone();
    }
    if config.target_dir.is_relative() {
        config.target_dir = cwd.join(&config.target_dir);
    }
    if !config.source_dir.as_os_str().is_empty() && config.source_dir.is_relative() {
        config.source_dir = cwd.join(&config.source_dir);
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sync_with_flags() {
        let cli = Cli::parse_from(["specsync", "sync", "--source", "/srv/fixtures"]);
        match cli.command {
            Command::Sync(args) => {
                assert_eq!(args.source, Some(PathBuf::from("/srv/fixtures")));
                assert_eq!(args.repo, None);
            }
            Command::Check(_) => panic!("expected sync"),
        }
    }

    #[test]
    fn parse_check() {
        let cli = Cli::parse_from(["specsync", "check", "--repo", "/srv/checkout"]);
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn abort_errors_map_to_documented_codes() {
        let missing: anyhow::Error = SyncAbort::MissingSource {
            path: PathBuf::from("/nope"),
        }
        .into();
        assert_eq!(exit_code_for(&missing), exit_codes::PRECONDITION);

        let dirty: anyhow::Error = SyncAbort::DirtyTarget {
            path: PathBuf::from("/checkout"),
            entries: Vec::new(),
        }
        .into();
        assert_eq!(exit_code_for(&dirty), exit_codes::PRECONDITION);

        let unchanged: anyhow::Error = SyncAbort::NoChanges.into();
        assert_eq!(exit_code_for(&unchanged), exit_codes::NO_CHANGES);

        let other = anyhow::anyhow!("git push failed");
        assert_eq!(exit_code_for(&other), exit_codes::INVALID);
    }
}
