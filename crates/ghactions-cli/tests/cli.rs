//! End-to-end tests for the ghactions binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn ghactions(event_name: &str, event_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ghactions").unwrap();
    cmd.env_clear()
        .env("GITHUB_EVENT_NAME", event_name)
        .env("GITHUB_EVENT_PATH", event_path)
        .env("GHACTIONS_LOG_LEVEL", "warn");
    cmd
}

#[test]
fn test_events_lists_supported_types() {
    Command::cargo_bin("ghactions")
        .unwrap()
        .env_clear()
        .arg("events")
        .assert()
        .success()
        .stdout(predicate::str::contains("issues\n"))
        .stdout(predicate::str::contains("workflow_run\n"));
}

#[test]
fn test_inspect_prints_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("event.json");
    std::fs::write(&path, r#"{"action":"started"}"#).unwrap();

    ghactions("watch", &path)
        .arg("inspect")
        .assert()
        .success()
        .stdout("watch (started)\n");
}

#[test]
fn test_inspect_unknown_event_type_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("event.json");
    std::fs::write(&path, "{}").unwrap();

    ghactions("bogus_type", &path)
        .arg("inspect")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("bogus_type"));
}

#[test]
fn test_inspect_missing_payload_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");

    ghactions("issues", &path)
        .arg("inspect")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn test_inspect_malformed_payload_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("event.json");
    std::fs::write(&path, "{\"action\":").unwrap();

    ghactions("issues", &path).arg("inspect").assert().code(3);
}

#[test]
fn test_inspect_without_event_name_exit_code() {
    Command::cargo_bin("ghactions")
        .unwrap()
        .env_clear()
        .arg("inspect")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GITHUB_EVENT_NAME"));
}

#[test]
fn test_context_hides_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("event.json");

    ghactions("push", &path)
        .env("GITHUB_TOKEN", "ghs_secret")
        .env("GITHUB_REPOSITORY", "octo-org/hello-world")
        .args(["context", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("repository=octo-org/hello-world"))
        .stdout(predicate::str::contains("token=<redacted>"))
        .stdout(predicate::str::contains("ghs_secret").not());
}
