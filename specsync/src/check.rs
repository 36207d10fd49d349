//! Preflight validation for a sync run.
//!
//! `specsync check` runs the same guards a sync starts with — source
//! directory present, checkout clean — and reports, without mutating
//! anything. Failures are the same [`crate::sync::SyncAbort`] values a real
//! run would abort with.

use anyhow::Result;

use crate::config::SyncConfig;
use crate::io::env::Environment;
use crate::sync::ensure_preconditions;

/// Validate that a sync could start right now.
pub fn run_check<E: Environment>(env: &E, config: &SyncConfig) -> Result<()> {
    config.validate()?;
    ensure_preconditions(env, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncAbort;
    use crate::test_support::ScriptedEnvironment;
    use std::path::PathBuf;

    fn config() -> SyncConfig {
        SyncConfig {
            source_dir: PathBuf::from("/srv/fixtures"),
            target_dir: PathBuf::from("/srv/checkout"),
            ..SyncConfig::default()
        }
    }

    #[test]
    fn passes_on_existing_source_and_clean_checkout() {
        let env = ScriptedEnvironment::new();
        env.script_clean(&[true]);
        run_check(&env, &config()).expect("check");
        assert_eq!(env.calls(), vec!["dir_exists", "repo_is_clean"]);
    }

    #[test]
    fn reports_missing_source() {
        let env = ScriptedEnvironment::without_source();
        let err = run_check(&env, &config()).expect_err("should fail");
        assert!(matches!(
            err.downcast_ref::<SyncAbort>(),
            Some(SyncAbort::MissingSource { .. })
        ));
    }

    #[test]
    fn reports_dirty_checkout_without_mutating() {
        let env = ScriptedEnvironment::new();
        env.script_clean(&[false]);
        let err = run_check(&env, &config()).expect_err("should fail");
        assert!(matches!(
            err.downcast_ref::<SyncAbort>(),
            Some(SyncAbort::DirtyTarget { .. })
        ));
        let calls = env.calls();
        assert!(calls.iter().all(|c| c != "pull" && c != "push"));
    }
}
