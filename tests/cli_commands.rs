use assert_cmd::prelude::*;
use serde_json::Value;
use std::process::Command;
use tempfile::tempdir;

fn robot(config_dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("robot").expect("robot binary");
    cmd.arg("--config")
        .arg(config_dir.path().join("config.yaml"))
        .env_remove("ROBOT_WEBDRIVER_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn show_prints_the_quiz_flow() {
    let dir = tempdir().unwrap();
    let assert = robot(&dir).arg("show").assert().success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let flow: serde_yaml::Value = serde_yaml::from_str(&stdout).expect("yaml output");
    assert_eq!(flow["id"].as_str(), Some("moodle-quiz"));
    assert_eq!(flow["steps"].as_sequence().map(Vec::len), Some(19));
}

#[test]
fn demo_reports_success_as_json() {
    let dir = tempdir().unwrap();
    let assert = robot(&dir)
        .args(["--output", "json", "demo", "--param", "username=jdoe"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let result: Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(result["success"].as_bool(), Some(true));
    assert_eq!(result["torn_down"].as_bool(), Some(true));
    assert_eq!(result["step_results"].as_array().map(Vec::len), Some(19));
}

#[test]
fn info_reports_build_stamp() {
    let dir = tempdir().unwrap();
    let assert = robot(&dir)
        .args(["--output", "json", "info"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let info: Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(info["version"].as_str(), Some(env!("CARGO_PKG_VERSION")));
    assert!(info["build_date"].as_str().unwrap().ends_with(" UTC"));
}

#[test]
fn settings_file_is_honoured() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        "webdriver:\n  url: http://grid.internal:4444\nwait:\n  timeout_ms: 750\n",
    )
    .unwrap();

    let assert = robot(&dir)
        .args(["--output", "json", "info"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let info: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(info["webdriver_url"].as_str(), Some("http://grid.internal:4444"));
    assert_eq!(info["wait"]["timeout_ms"].as_u64(), Some(750));
}

#[test]
fn malformed_param_is_rejected() {
    let dir = tempdir().unwrap();
    robot(&dir)
        .args(["demo", "--param", "username"])
        .assert()
        .failure();
}

#[test]
fn unreachable_webdriver_fails_the_run() {
    let dir = tempdir().unwrap();
    robot(&dir)
        .args(["run", "--webdriver", "http://127.0.0.1:9", "--timeout-ms", "100"])
        .assert()
        .failure()
        .code(1);
}
