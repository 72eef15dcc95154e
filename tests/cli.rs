// ABOUTME: Integration tests for the kubeship CLI commands.
// ABOUTME: Validates --help output, init behavior and argument errors.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const CONFIG_ENV: &[&str] = &[
    "KUBESHIP_NAMESPACE",
    "KUBESHIP_DEPLOYMENT",
    "KUBESHIP_CONTAINER",
    "KUBESHIP_ROLLOUT_TIMEOUT",
    "ECR_REGISTRY",
    "ECR_REPOSITORY",
    "AWS_ACCOUNT_ID",
    "EKS_CLUSTER_NAME",
    "KUBE_CONTEXT",
];

fn kubeship_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kubeship"));
    for var in CONFIG_ENV {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_shows_commands() {
    kubeship_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("rollback"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("kubeship.yml");

    kubeship_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--deployment", "web", "--container", "app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created kubeship.yml"));

    assert!(config_path.exists(), "kubeship.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("deployment: web"), "{content}");
    assert!(content.contains("container: app"), "{content}");
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("kubeship.yml");

    fs::write(&config_path, "existing: config").unwrap();

    kubeship_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let content = fs::read_to_string(&config_path).unwrap();
    assert_eq!(content, "existing: config", "Original config should be preserved");
}

#[test]
fn init_rejects_invalid_names() {
    let temp_dir = tempfile::tempdir().unwrap();

    kubeship_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--deployment", "My_App"])
        .assert()
        .failure();

    assert!(!temp_dir.path().join("kubeship.yml").exists());
}

#[test]
fn deploy_without_target_fails_before_side_effects() {
    let temp_dir = tempfile::tempdir().unwrap();

    kubeship_cmd()
        .current_dir(temp_dir.path())
        .args(["deploy", "v1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("target.deployment"));
}

#[test]
fn deploy_with_missing_config_file_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    kubeship_cmd()
        .current_dir(temp_dir.path())
        .args(["--config", "nope.yml", "deploy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.yml"));
}

#[test]
fn unknown_destination_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("kubeship.yml"),
        "target:\n  deployment: web\n  container: app\n",
    )
    .unwrap();

    kubeship_cmd()
        .current_dir(temp_dir.path())
        .args(["status", "--destination", "staging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn json_errors_are_json_lines() {
    let temp_dir = tempfile::tempdir().unwrap();

    let assert = kubeship_cmd()
        .current_dir(temp_dir.path())
        .args(["--json", "deploy", "v1"])
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    let line = stderr
        .lines()
        .find(|l| l.starts_with('{'))
        .expect("a JSON error line");
    let event: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(event["event"], "error");
}

#[test]
fn quiet_conflicts_with_json() {
    kubeship_cmd()
        .args(["--quiet", "--json", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn invalid_timeout_is_rejected() {
    kubeship_cmd()
        .args(["deploy", "--timeout", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a duration"));

    kubeship_cmd()
        .args(["deploy", "--timeout", "0s"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));
}
