//! Gateway behaviour against real git repositories in temp dirs.
//!
//! These tests shell out to the system `git`, the same binary the gateway
//! drives in production. Every test builds its own bare origin seeded with
//! one commit, so clones, pulls and pushes are exercised for real.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use dashpub_core::TargetConfig;
use dashpub_repo::{GitWorkingCopy, RepoError};

/// Run git in `dir`, panicking with diagnostics on failure.
fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn set_identity(dir: &Path) {
    git(dir, &["config", "user.email", "dashpub@test.invalid"]);
    git(dir, &["config", "user.name", "dashpub tests"]);
}

/// A bare origin seeded with one commit on `master`, plus the seed clone
/// used to push follow-up commits.
fn seeded_origin(root: &Path) -> (PathBuf, PathBuf) {
    let origin = root.join("origin.git");
    std::fs::create_dir_all(&origin).expect("mkdir origin");
    git(&origin, &["init", "--bare", "--initial-branch=master"]);

    let seed = root.join("seed");
    std::fs::create_dir_all(&seed).expect("mkdir seed");
    git(&seed, &["init", "--initial-branch=master"]);
    set_identity(&seed);
    std::fs::write(seed.join("README.md"), "dashboards\n").expect("write README");
    git(&seed, &["add", "-A"]);
    git(&seed, &["commit", "-m", "initial"]);
    git(&seed, &["remote", "add", "origin", origin.to_str().expect("utf8 path")]);
    git(&seed, &["push", "origin", "master"]);

    (origin, seed)
}

fn target(repo_url: &str, clone_path: &Path) -> TargetConfig {
    TargetConfig {
        repo_url: repo_url.to_string(),
        clone_path: clone_path.to_path_buf(),
        dashboard_path: PathBuf::new(),
        branch: "master".to_string(),
        gitlab: Default::default(),
    }
}

#[test]
fn ensure_current_clones_a_missing_working_copy() {
    let root = TempDir::new().expect("tempdir");
    let (origin, _seed) = seeded_origin(root.path());
    let clone_path = root.path().join("clone");

    let copy = GitWorkingCopy::new(&target(origin.to_str().expect("utf8"), &clone_path));
    copy.ensure_current().expect("clone");

    assert!(clone_path.join(".git").exists());
    assert!(clone_path.join("README.md").exists());
    assert_eq!(
        git(&clone_path, &["rev-parse", "--abbrev-ref", "HEAD"]),
        "master"
    );
}

#[test]
fn ensure_current_refuses_a_mismatched_remote() {
    let root = TempDir::new().expect("tempdir");
    let (origin, _seed) = seeded_origin(root.path());
    let origin_url = origin.to_str().expect("utf8").to_string();
    let clone_path = root.path().join("clone");

    GitWorkingCopy::new(&target(&origin_url, &clone_path))
        .ensure_current()
        .expect("clone");

    let elsewhere = "https://example.com/elsewhere.git";
    let err = GitWorkingCopy::new(&target(elsewhere, &clone_path))
        .ensure_current()
        .unwrap_err();
    match err {
        RepoError::RemoteMismatch { expected, actual } => {
            assert_eq!(expected, elsewhere);
            assert_eq!(actual, origin_url);
        }
        other => panic!("expected RemoteMismatch, got {other:?}"),
    }
}

#[test]
fn ensure_current_pulls_new_commits() {
    let root = TempDir::new().expect("tempdir");
    let (origin, seed) = seeded_origin(root.path());
    let clone_path = root.path().join("clone");

    let copy = GitWorkingCopy::new(&target(origin.to_str().expect("utf8"), &clone_path));
    copy.ensure_current().expect("clone");
    assert!(!clone_path.join("late.txt").exists());

    std::fs::write(seed.join("late.txt"), "added later\n").expect("write");
    git(&seed, &["add", "-A"]);
    git(&seed, &["commit", "-m", "late addition"]);
    git(&seed, &["push", "origin", "master"]);

    copy.ensure_current().expect("pull");
    assert!(clone_path.join("late.txt").exists());
}

#[test]
fn local_mode_accepts_an_existing_repository() {
    let root = TempDir::new().expect("tempdir");
    let (_origin, seed) = seeded_origin(root.path());

    GitWorkingCopy::new(&target("local", &seed))
        .ensure_current()
        .expect("existing repository answers git status");
}

#[test]
fn local_mode_rejects_a_plain_directory() {
    let root = TempDir::new().expect("tempdir");
    let plain = root.path().join("plain");
    std::fs::create_dir_all(&plain).expect("mkdir");

    let err = GitWorkingCopy::new(&target("local", &plain))
        .ensure_current()
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::GitCommand { action: "checking target repository", .. }
    ));
}

#[test]
fn commit_and_push_reach_the_origin() {
    let root = TempDir::new().expect("tempdir");
    let (origin, _seed) = seeded_origin(root.path());
    let clone_path = root.path().join("clone");

    let copy = GitWorkingCopy::new(&target(origin.to_str().expect("utf8"), &clone_path));
    copy.ensure_current().expect("clone");
    set_identity(&clone_path);

    std::fs::create_dir_all(clone_path.join("Sales Team")).expect("mkdir");
    std::fs::write(
        clone_path.join("Sales Team").join("sales.json"),
        "{\n  \"uid\": \"a1b2c3\",\n  \"version\": 4\n}\n",
    )
    .expect("write dashboard");

    copy.commit("Published updates to Sales.\n\nSales: new panel\n")
        .expect("commit");
    copy.push().expect("push");

    assert_eq!(
        git(&origin, &["log", "-1", "--format=%s"]),
        "Published updates to Sales."
    );
    let body = git(&origin, &["log", "-1", "--format=%B"]);
    assert!(body.contains("Sales: new panel"));
}

#[test]
fn commit_without_changes_fails() {
    let root = TempDir::new().expect("tempdir");
    let (origin, _seed) = seeded_origin(root.path());
    let clone_path = root.path().join("clone");

    let copy = GitWorkingCopy::new(&target(origin.to_str().expect("utf8"), &clone_path));
    copy.ensure_current().expect("clone");
    set_identity(&clone_path);

    // Callers only commit after at least one file was written.
    let err = copy.commit("empty").unwrap_err();
    assert!(matches!(err, RepoError::GitCommand { action: "committing changes", .. }));
}
