use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_demo_command_fetches_every_key() {
    let mut cmd = Command::cargo_bin("bulkget").unwrap();
    let out = cmd
        .args(["demo", "--slow-ms", "200", "--events", "none"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(out).unwrap();
    assert_eq!(stdout.matches("found bulkget_example_").count(), 10);
    assert!(stdout.contains("completed: 10 succeeded, 0 failed"));
    // The slow key is the last one found.
    let last_found = stdout.lines().filter(|l| l.starts_with("found ")).last().unwrap();
    assert!(last_found.starts_with("found bulkget_example_3 "));
}

#[test]
fn test_demo_json_output() {
    let mut cmd = Command::cargo_bin("bulkget").unwrap();
    let out = cmd
        .args(["demo", "--slow-ms", "50", "--events", "none", "--metrics", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["status"], "completed");
    assert_eq!(v["succeeded_count"], 10);
    assert_eq!(v["outcomes"].as_array().unwrap().len(), 10);
    assert_eq!(v["metrics"]["requests"], 10);
}

#[test]
fn test_demo_deadline_cancels_slow_key() {
    let mut cmd = Command::cargo_bin("bulkget").unwrap();
    cmd.args([
        "demo",
        "--slow-ms",
        "5000",
        "--timeout-ms",
        "10000",
        "--deadline-ms",
        "300",
        "--events",
        "none",
    ])
    .assert()
    .failure()
    .code(3);
}

#[test]
fn test_fetch_zero_concurrency_is_config_error() {
    let mut cmd = Command::cargo_bin("bulkget").unwrap();
    cmd.args(["fetch", "k1", "k2", "--source", "memory", "--concurrency", "0"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_fetch_without_keys_is_config_error() {
    let mut cmd = Command::cargo_bin("bulkget").unwrap();
    cmd.args(["fetch", "--source", "memory"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_fetch_missing_keys_reports_failures() {
    let tmp_dir = TempDir::new().unwrap();
    let keys_path = tmp_dir.path().join("keys.yaml");
    fs::write(&keys_path, "- a\n- b\n").unwrap();

    let mut cmd = Command::cargo_bin("bulkget").unwrap();
    let out = cmd
        .args([
            "fetch",
            "--source",
            "memory",
            "--events",
            "none",
            "--format",
            "json",
            "--keys-file",
            keys_path.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(3)
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["failed_count"], 2);
    assert_eq!(v["outcomes"][0]["kind"], "not_found");
}

#[test]
fn test_fetch_http_requires_base_url() {
    let mut cmd = Command::cargo_bin("bulkget").unwrap();
    cmd.args(["fetch", "k1", "--source", "http"])
        .assert()
        .failure()
        .code(4);
}
