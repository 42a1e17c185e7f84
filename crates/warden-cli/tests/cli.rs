//! End-to-end tests for the `warden` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn warden() -> Command {
    Command::cargo_bin("warden").expect("binary builds")
}

#[test]
fn test_block_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blocklist.json");

    warden()
        .args(["--blocklist", path.to_str().unwrap(), "block", "9.9.9.9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("9.9.9.9 has been blocked"));

    warden()
        .args(["--blocklist", path.to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("9.9.9.9"));
}

#[test]
fn test_unblock_missing_ip_reports_not_blocked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blocklist.json");

    warden()
        .args(["--blocklist", path.to_str().unwrap(), "unblock", "1.2.3.4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3.4 was not blocked"));
}

#[test]
fn test_invalid_ip_literal_exits_nonzero() {
    warden()
        .args(["block", "999.999.999.999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_invalid_ip_does_not_create_blocklist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blocklist.json");

    warden()
        .args(["--blocklist", path.to_str().unwrap(), "block", "not-an-ip"])
        .assert()
        .failure();

    assert!(!path.exists());
}
