//! End-to-end tests for the `sgate` binary.
//!
//! These drive the compiled binary against real git repositories, with
//! the external verifier played by small stub scripts, and assert on
//! exit status and operator-facing output.

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn run_git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed to start");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A remote repository with an initial commit on branch `release`.
fn make_remote() -> TempDir {
    let dir = TempDir::new().unwrap();
    run_git(dir.path(), &["init", "-q"]);
    run_git(dir.path(), &["config", "user.email", "test@example.com"]);
    run_git(dir.path(), &["config", "user.name", "Test User"]);
    std::fs::write(dir.path().join("README.md"), "# component\n").unwrap();
    run_git(dir.path(), &["add", "README.md"]);
    run_git(dir.path(), &["commit", "-q", "-m", "Initial commit"]);
    run_git(dir.path(), &["branch", "release"]);
    dir
}

/// Write an executable verifier stub.
#[cfg(unix)]
fn write_verifier(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// The binary with a hermetic environment: no ambient config file, no
/// stray SOURCEGATE_* variables.
fn sgate(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sgate").unwrap();
    cmd.env("HOME", home);
    for var in [
        "SOURCEGATE_CONFIG",
        "SOURCEGATE_BRANCH",
        "SOURCEGATE_URL",
        "SOURCEGATE_REMOTE",
        "SOURCEGATE_SKIP_VERIFY",
        "SOURCEGATE_COMMIT_SIG_SUFFICIENT",
        "SOURCEGATE_VERIFIER",
        "XDG_CONFIG_HOME",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn malformed_branch_fails_before_any_git_work() {
    let workspace = TempDir::new().unwrap();

    sgate(workspace.path())
        .args([
            "comp",
            "--branch",
            "../etc",
            "--url",
            "https://example.invalid/x.git",
            "--cwd",
        ])
        .arg(workspace.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid input"));

    assert!(!workspace.path().join("comp").exists());
}

#[test]
fn absent_branch_with_ignore_missing_exits_zero() {
    let remote = make_remote();
    let workspace = TempDir::new().unwrap();

    sgate(workspace.path())
        .args(["comp", "--branch", "nosuchbranch", "--ignore-missing", "--url"])
        .arg(remote.path())
        .arg("--cwd")
        .arg(workspace.path())
        .assert()
        .success();

    assert!(!workspace.path().join("comp").exists());
}

#[test]
fn absent_branch_without_ignore_missing_fails() {
    let remote = make_remote();
    let workspace = TempDir::new().unwrap();

    sgate(workspace.path())
        .args(["comp", "--branch", "nosuchbranch", "--url"])
        .arg(remote.path())
        .arg("--cwd")
        .arg(workspace.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[cfg(unix)]
#[test]
fn accepting_verifier_yields_checked_out_copy() {
    let remote = make_remote();
    let workspace = TempDir::new().unwrap();
    let verifier = write_verifier(workspace.path(), "accept.sh", "exit 0");

    sgate(workspace.path())
        .args(["comp", "--branch", "release", "--url"])
        .arg(remote.path())
        .arg("--verifier")
        .arg(&verifier)
        .arg("--cwd")
        .arg(workspace.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("synchronized"));

    let dir = workspace.path().join("comp");
    assert!(dir.join(".git").exists());
    assert!(dir.join("README.md").exists());
}

#[cfg(unix)]
#[test]
fn rejecting_verifier_fails_and_removes_fresh_clone() {
    let remote = make_remote();
    let workspace = TempDir::new().unwrap();
    let verifier = write_verifier(workspace.path(), "reject.sh", "exit 1");

    sgate(workspace.path())
        .args(["comp", "--branch", "release", "--url"])
        .arg(remote.path())
        .arg("--verifier")
        .arg(&verifier)
        .arg("--cwd")
        .arg(workspace.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("verification rejected"));

    assert!(!workspace.path().join("comp").exists());
}

#[cfg(unix)]
#[test]
fn verifier_is_invoked_with_workdir_oid_and_policy() {
    let remote = make_remote();
    let workspace = TempDir::new().unwrap();
    let log = workspace.path().join("verifier.log");
    let verifier = write_verifier(
        workspace.path(),
        "log.sh",
        &format!("echo \"$1 $2 $3\" > {}\nexit 0", log.display()),
    );

    sgate(workspace.path())
        .args(["comp", "--branch", "release", "--url"])
        .arg(remote.path())
        .arg("--verifier")
        .arg(&verifier)
        .arg("--cwd")
        .arg(workspace.path())
        .assert()
        .success();

    let logged = std::fs::read_to_string(&log).unwrap();
    let fields: Vec<&str> = logged.split_whitespace().collect();
    assert_eq!(fields.len(), 3);
    assert!(fields[0].ends_with("comp"));
    assert_eq!(fields[1].len(), 40);
    assert_eq!(fields[2], "signed-tag");
}

#[test]
fn skip_list_prints_loud_banner() {
    let remote = make_remote();
    let workspace = TempDir::new().unwrap();

    sgate(workspace.path())
        .args([
            "comp",
            "--branch",
            "release",
            "--skip-verify-list",
            "comp",
            "--url",
        ])
        .arg(remote.path())
        .arg("--cwd")
        .arg(workspace.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("DISABLED"));
}

#[test]
fn skip_banner_survives_quiet_mode() {
    let remote = make_remote();
    let workspace = TempDir::new().unwrap();

    sgate(workspace.path())
        .args([
            "comp",
            "--quiet",
            "--branch",
            "release",
            "--skip-verify-list",
            "comp",
            "--url",
        ])
        .arg(remote.path())
        .arg("--cwd")
        .arg(workspace.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("DISABLED"));
}

#[test]
fn component_derived_from_path() {
    let remote = make_remote();
    let workspace = TempDir::new().unwrap();

    sgate(workspace.path())
        .args([
            "--path",
            "comp",
            "--branch",
            "release",
            "--skip-verify-list",
            "comp",
            "--url",
        ])
        .arg(remote.path())
        .arg("--cwd")
        .arg(workspace.path())
        .assert()
        .success();

    assert!(workspace.path().join("comp/.git").exists());
}

#[test]
fn completions_generate() {
    let workspace = TempDir::new().unwrap();

    sgate(workspace.path())
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sgate"));
}

#[test]
fn config_file_supplies_template() {
    let remote = make_remote();
    let workspace = TempDir::new().unwrap();

    // Component in the skip list so no verifier binary is needed; the
    // URL comes from the config file instead of the command line.
    let config_path = workspace.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "[verify]\nskip = [\"comp\"]\n\n[components.comp]\nurl = \"{}\"\n",
            remote.path().display()
        ),
    )
    .unwrap();

    sgate(workspace.path())
        .args(["comp", "--branch", "release", "--config"])
        .arg(&config_path)
        .arg("--cwd")
        .arg(workspace.path())
        .assert()
        .success();

    assert!(workspace.path().join("comp/.git").exists());
}
