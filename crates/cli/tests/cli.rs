use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir) -> std::path::PathBuf {
    let db_path = dir.path().join("state.sqlite");
    let content = format!(
        "[general]\nstate_db_path = \"{}\"\ndry_run = true\n",
        db_path.display()
    );
    let path = dir.path().join("config.toml");
    fs::write(&path, content).expect("write config");
    path
}

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    let mut cmd = cargo_bin_cmd!("brandcast");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("state_db_path"));
    assert!(content.contains("dry_run = true"));
    assert!(content.contains("[upload_post]"));
}

#[test]
fn publish_dry_run_succeeds_offline() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("brandcast");
    let output = cmd
        .args(["--config"])
        .arg(&config_path)
        .args([
            "publish",
            "--platform",
            "facebook",
            "--caption",
            "Launch week is here",
            "--dry-run",
            "--json",
        ])
        .output()
        .expect("run publish");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["status"], "dry_run");
    assert_eq!(value["platform"], "facebook");
}

#[test]
fn publish_rejects_unsupported_platform() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("brandcast");
    cmd.args(["--config"])
        .arg(&config_path)
        .args([
            "publish",
            "--platform",
            "myspace",
            "--caption",
            "Nobody is here anymore",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported platform"));
}

#[test]
fn schedule_add_and_list_roundtrip() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("brandcast");
    cmd.args(["--config"])
        .arg(&config_path)
        .args([
            "schedule",
            "add",
            "--platform",
            "facebook",
            "--caption",
            "Scheduled launch post",
            "--at",
            "2030-01-01T09:00:00Z",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scheduled facebook post"));

    let mut cmd = cargo_bin_cmd!("brandcast");
    let output = cmd
        .args(["--config"])
        .arg(&config_path)
        .args(["schedule", "list", "--json"])
        .output()
        .expect("run schedule list");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let posts = value.as_array().expect("array of posts");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["platform"], "facebook");
    assert_eq!(posts[0]["status"], "pending");
    assert_eq!(posts[0]["content"]["caption"], "Scheduled launch post");
}

#[test]
fn schedule_add_rejects_policy_violation() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);

    // Instagram requires media
    let mut cmd = cargo_bin_cmd!("brandcast");
    cmd.args(["--config"])
        .arg(&config_path)
        .args([
            "schedule",
            "add",
            "--platform",
            "instagram",
            "--caption",
            "Text only",
            "--at",
            "2030-01-01T09:00:00Z",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("media"));
}

#[test]
fn run_once_dry_run_completes() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("brandcast");
    cmd.args(["--config"])
        .arg(&config_path)
        .args(["run", "--once", "--dry-run"])
        .assert()
        .success();
}

#[test]
fn doctor_reports_json() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("brandcast");
    let output = cmd
        .args(["--config"])
        .arg(&config_path)
        .args(["doctor", "--json"])
        .output()
        .expect("run doctor");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["config"]["status"], "ok");
    assert_eq!(value["store"]["status"], "ok");
    assert!(value.get("overall").is_some());
}
