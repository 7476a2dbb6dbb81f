//! Binary-level checks that need no network and no git remote.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn glsync_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("glsync"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("GLSYNC_TOKEN");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().expect("home");
    glsync_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("sync"))
        .stdout(contains("config"));
}

#[test]
fn sync_without_token_fails_with_diagnostic() {
    let home = TempDir::new().expect("home");
    glsync_cmd(home.path())
        .args(["sync", "--group", "g", "--local-root", "/tmp/repos"])
        .assert()
        .failure()
        .stderr(contains("--token"))
        .stderr(contains("config.yaml"));
}

#[test]
fn sync_without_group_fails_with_diagnostic() {
    let home = TempDir::new().expect("home");
    glsync_cmd(home.path())
        .args(["sync", "--token", "t", "--local-root", "/tmp/repos"])
        .assert()
        .failure()
        .stderr(contains("--group"));
}

#[test]
fn config_reports_unset_fields_and_redacts_token() {
    let home = TempDir::new().expect("home");
    let dir = home.path().join(".glsync");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("config.yaml"), "token: super-secret\n").expect("write");

    glsync_cmd(home.path())
        .arg("config")
        .assert()
        .success()
        .stdout(contains("<redacted>"))
        .stdout(contains("(unset)"))
        .stdout(contains("https://gitlab.com"));

    let output = glsync_cmd(home.path())
        .arg("config")
        .output()
        .expect("run config");
    assert!(
        !String::from_utf8_lossy(&output.stdout).contains("super-secret"),
        "token must never be printed"
    );
}

#[test]
fn config_sees_a_token_supplied_via_env() {
    let home = TempDir::new().expect("home");
    glsync_cmd(home.path())
        .env("GLSYNC_TOKEN", "env-secret")
        .arg("config")
        .assert()
        .success()
        .stdout(contains("<redacted> (from GLSYNC_TOKEN)"));

    let output = glsync_cmd(home.path())
        .env("GLSYNC_TOKEN", "env-secret")
        .arg("config")
        .output()
        .expect("run config");
    assert!(
        !String::from_utf8_lossy(&output.stdout).contains("env-secret"),
        "token must never be printed"
    );
}

#[test]
fn config_works_without_a_config_file() {
    let home = TempDir::new().expect("home");
    glsync_cmd(home.path())
        .arg("config")
        .assert()
        .success()
        .stdout(contains("(absent)"));
}
