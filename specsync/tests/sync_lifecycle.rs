//! Lifecycle tests for the sync workflow against real git repositories.
//!
//! Each test builds a bare origin plus a tracking checkout via `TestRepo`
//! and drives `run_sync` with the shell-backed environment, then inspects
//! the resulting git history on both ends.

use specsync::io::env::ShellEnvironment;
use specsync::sync::{
    CommitOutcome, FIXTURES_COMMIT_MESSAGE, SPEC_COMMIT_MESSAGE, SyncAbort, run_sync,
};
use specsync::test_support::{BufferReporter, TestRepo};

#[test]
fn full_sync_commits_both_categories_and_pushes() {
    let repo = TestRepo::new().expect("repo");
    repo.write_source("fixtures.json", "{\"seed\":2}\n")
        .expect("write fixtures");
    repo.write_source("spec.yaml", "openapi: 3.1.0\n")
        .expect("write spec");

    let env = ShellEnvironment::new(repo.checkout());
    let mut reporter = BufferReporter::default();
    let outcome = run_sync(&env, &repo.config(), &mut reporter).expect("sync");

    assert_eq!(outcome.fixtures, CommitOutcome::Committed);
    assert_eq!(outcome.spec, CommitOutcome::Committed);
    assert_eq!(outcome.files_copied, 2);

    // Two commits, fixture data first, newest-first in the log.
    let messages = repo.log_messages().expect("log");
    assert_eq!(messages[0], SPEC_COMMIT_MESSAGE);
    assert_eq!(messages[1], FIXTURES_COMMIT_MESSAGE);

    // Both commits made it to the remote.
    let origin = repo.origin_log_messages().expect("origin log");
    assert_eq!(origin[0], SPEC_COMMIT_MESSAGE);
    assert_eq!(origin[1], FIXTURES_COMMIT_MESSAGE);

    // Step lines appear in workflow order.
    let steps: Vec<&str> = reporter
        .lines
        .iter()
        .filter(|line| line.starts_with("--> "))
        .map(String::as_str)
        .collect();
    assert_eq!(steps[0], "--> Pulling latest changes");
    assert!(steps[1].starts_with("--> Copying"), "got {:?}", steps[1]);
    assert_eq!(steps[2], "--> Committing fixture data changes");
    assert_eq!(steps[3], "--> Committing specification changes");
    assert_eq!(steps[4], "--> Pushing to remote");
}

#[test]
fn fixture_only_change_skips_spec_commit() {
    let repo = TestRepo::new().expect("repo");
    repo.write_source("fixtures.json", "{\"seed\":3}\n")
        .expect("write fixtures");

    let env = ShellEnvironment::new(repo.checkout());
    let mut reporter = BufferReporter::default();
    let outcome = run_sync(&env, &repo.config(), &mut reporter).expect("sync");

    assert_eq!(outcome.fixtures, CommitOutcome::Committed);
    assert_eq!(outcome.spec, CommitOutcome::Skipped);

    let messages = repo.log_messages().expect("log");
    assert_eq!(messages[0], FIXTURES_COMMIT_MESSAGE);
    assert_eq!(messages[1], "Initial fixtures");

    assert!(
        reporter
            .lines
            .contains(&"--> No specification changes, skipping commit".to_string()),
        "missing skip line: {:?}",
        reporter.lines
    );
}

#[test]
fn spec_only_change_skips_fixture_commit() {
    let repo = TestRepo::new().expect("repo");
    repo.write_source("spec.yaml", "openapi: 3.1.1\n")
        .expect("write spec");

    let env = ShellEnvironment::new(repo.checkout());
    let mut reporter = BufferReporter::default();
    let outcome = run_sync(&env, &repo.config(), &mut reporter).expect("sync");

    assert_eq!(outcome.fixtures, CommitOutcome::Skipped);
    assert_eq!(outcome.spec, CommitOutcome::Committed);
    assert!(
        reporter
            .lines
            .contains(&"--> No fixture data changes, skipping commit".to_string())
    );

    let origin = repo.origin_log_messages().expect("origin log");
    assert_eq!(origin[0], SPEC_COMMIT_MESSAGE);
}

#[test]
fn dirty_checkout_aborts_before_pulling_or_committing() {
    let repo = TestRepo::new().expect("repo");
    repo.write_source("fixtures.json", "{\"seed\":4}\n")
        .expect("write fixtures");
    repo.write_checkout("notes.md", "wip\n").expect("dirty");

    let env = ShellEnvironment::new(repo.checkout());
    let mut reporter = BufferReporter::default();
    let err = run_sync(&env, &repo.config(), &mut reporter).expect_err("should abort");

    let abort = err.downcast_ref::<SyncAbort>().expect("abort error");
    assert!(matches!(abort, SyncAbort::DirtyTarget { .. }));
    assert!(err.to_string().contains("notes.md"), "got: {err:#}");

    // Nothing was pulled, committed, or pushed.
    assert!(reporter.lines.is_empty());
    assert_eq!(repo.log_messages().expect("log"), vec!["Initial fixtures"]);
}

#[test]
fn identical_source_aborts_with_no_changes() {
    let repo = TestRepo::new().expect("repo");

    let env = ShellEnvironment::new(repo.checkout());
    let mut reporter = BufferReporter::default();
    let err = run_sync(&env, &repo.config(), &mut reporter).expect_err("should abort");

    let abort = err.downcast_ref::<SyncAbort>().expect("abort error");
    assert_eq!(*abort, SyncAbort::NoChanges);

    // Pull and copy ran, then the run stopped.
    assert!(
        reporter
            .lines
            .contains(&"--> Pulling latest changes".to_string())
    );
    assert_eq!(
        repo.origin_log_messages().expect("origin log"),
        vec!["Initial fixtures"]
    );
}

#[test]
fn missing_source_aborts_before_touching_the_checkout() {
    let repo = TestRepo::new().expect("repo");
    let mut config = repo.config();
    config.source_dir = repo.checkout().join("no-such-fixtures");

    let env = ShellEnvironment::new(repo.checkout());
    let mut reporter = BufferReporter::default();
    let err = run_sync(&env, &config, &mut reporter).expect_err("should abort");

    let abort = err.downcast_ref::<SyncAbort>().expect("abort error");
    assert!(matches!(abort, SyncAbort::MissingSource { .. }));
    assert!(reporter.lines.is_empty());
}

#[test]
fn new_source_files_land_in_the_subtree_and_get_committed() {
    let repo = TestRepo::new().expect("repo");
    repo.write_source("fixtures.csv", "id,name\n1,a\n")
        .expect("write new fixture");

    let env = ShellEnvironment::new(repo.checkout());
    let mut reporter = BufferReporter::default();
    let outcome = run_sync(&env, &repo.config(), &mut reporter).expect("sync");

    assert_eq!(outcome.fixtures, CommitOutcome::Committed);
    assert!(repo.checkout().join("spec/fixtures.csv").exists());

    let messages = repo.log_messages().expect("log");
    assert_eq!(messages[0], FIXTURES_COMMIT_MESSAGE);
}
