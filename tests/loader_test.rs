mod common;

use common::{MockVcs, ScriptedPrompter};
use pytemplator::error::Error;
use pytemplator::loader::{acquire, AcquireOptions};
use std::fs;
use tempfile::TempDir;

const REPO: &str = "https://github.com/user/python-template.git";

fn options(base_dir: &std::path::Path, non_interactive: bool) -> AcquireOptions<'_> {
    AcquireOptions { base_dir, checkout_ref: "master", non_interactive }
}

#[test]
fn test_local_template_is_used_in_place() {
    let base = TempDir::new().unwrap();
    let template = TempDir::new().unwrap();
    let vcs = MockVcs::default();
    let prompter = ScriptedPrompter::default();

    let source = acquire(
        &vcs,
        &prompter,
        template.path().to_str().unwrap(),
        &options(base.path(), true),
    )
    .unwrap();

    assert!(!source.is_remote);
    assert_eq!(source.local_directory, template.path().canonicalize().unwrap());
    assert!(vcs.calls().is_empty());
}

#[test]
fn test_missing_local_template() {
    let base = TempDir::new().unwrap();
    let vcs = MockVcs::default();
    let prompter = ScriptedPrompter::default();
    let missing = base.path().join("missing");

    let result =
        acquire(&vcs, &prompter, missing.to_str().unwrap(), &options(base.path(), true));
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_git_template_is_cloned_into_base_dir() {
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("nested/base");
    let vcs = MockVcs::default();
    let prompter = ScriptedPrompter::default();

    let source = acquire(&vcs, &prompter, REPO, &options(&base, true)).unwrap();

    assert!(source.is_remote);
    assert_eq!(source.location, REPO);
    assert_eq!(source.local_directory, base.join("python-template"));
    assert!(source.local_directory.is_dir());
    assert_eq!(vcs.calls(), vec![format!("clone {REPO}"), "checkout master".to_string()]);
}

#[test]
fn test_cached_git_template_is_fetched() {
    let base = TempDir::new().unwrap();
    fs::create_dir(base.path().join("python-template")).unwrap();
    let vcs = MockVcs::default();
    let prompter = ScriptedPrompter::default();

    acquire(&vcs, &prompter, REPO, &options(base.path(), true)).unwrap();
    assert_eq!(vcs.calls(), vec!["fetch python-template", "checkout master"]);
}

#[test]
fn test_failed_fetch_falls_back_to_cache_without_input() {
    let base = TempDir::new().unwrap();
    fs::create_dir(base.path().join("python-template")).unwrap();
    let vcs = MockVcs { fail_fetch: true, ..MockVcs::default() };
    let prompter = ScriptedPrompter::default();

    let source = acquire(&vcs, &prompter, REPO, &options(base.path(), true)).unwrap();
    assert_eq!(source.local_directory, base.path().join("python-template"));
    assert_eq!(vcs.calls(), vec!["fetch python-template", "checkout master"]);
    assert!(prompter.asked.borrow().is_empty());
}

#[test]
fn test_failed_fetch_asks_before_using_cache() {
    let base = TempDir::new().unwrap();
    fs::create_dir(base.path().join("python-template")).unwrap();
    let vcs = MockVcs { fail_fetch: true, ..MockVcs::default() };

    let accepting = ScriptedPrompter::with_confirms(&[true]);
    acquire(&vcs, &accepting, REPO, &options(base.path(), false)).unwrap();
    assert_eq!(accepting.asked.borrow().len(), 1);

    let declining = ScriptedPrompter::with_confirms(&[false]);
    let result = acquire(&vcs, &declining, REPO, &options(base.path(), false));
    assert!(matches!(result, Err(Error::UserCancellation)));
}

#[test]
fn test_failed_clone_is_a_broken_template() {
    let base = TempDir::new().unwrap();
    let vcs = MockVcs { fail_clone: true, ..MockVcs::default() };
    let prompter = ScriptedPrompter::default();

    let result = acquire(&vcs, &prompter, REPO, &options(base.path(), true));
    assert!(matches!(result, Err(Error::BrokenTemplate(_))));
    assert_eq!(vcs.calls(), vec![format!("clone {REPO}")]);
}

#[test]
fn test_checkout_is_retried_after_reset() {
    let base = TempDir::new().unwrap();
    let vcs = MockVcs::default();
    vcs.failing_checkouts.set(1);
    let prompter = ScriptedPrompter::default();

    acquire(&vcs, &prompter, REPO, &options(base.path(), true)).unwrap();
    assert_eq!(
        vcs.calls(),
        vec![
            format!("clone {REPO}"),
            "checkout master".to_string(),
            "reset origin/master".to_string(),
            "checkout master".to_string(),
        ]
    );
}

#[test]
fn test_unknown_ref_is_invalid_input() {
    let base = TempDir::new().unwrap();
    let vcs = MockVcs { fail_reset: true, ..MockVcs::default() };
    vcs.failing_checkouts.set(1);
    let prompter = ScriptedPrompter::default();

    let result = acquire(&vcs, &prompter, REPO, &options(base.path(), true));
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}
