//! Smoke tests for the canvas-probe CLI
//!
//! Everything here runs without a browser.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the canvas-probe binary
fn canvas_probe() -> Command {
    Command::cargo_bin("canvas-probe").expect("canvas-probe binary should exist")
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    canvas_probe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.3.0"));
}

#[test]
fn test_help_flag() {
    canvas_probe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("layout"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_no_args_shows_usage() {
    canvas_probe()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_subcommand_help() {
    for sub in ["layout", "run", "inspect", "config"] {
        canvas_probe().args([sub, "--help"]).assert().success();
    }
}

// ============================================================================
// layout
// ============================================================================

#[test]
fn test_layout_text_online() {
    canvas_probe()
        .args(["layout", "--width", "500", "--height", "800"])
        .assert()
        .success()
        .stdout(predicate::str::contains("canvas 500x800"))
        .stdout(predicate::str::contains("(32, 44)"))
        .stdout(predicate::str::contains("435x72"))
        .stdout(predicate::str::contains("btn_equal"));
}

#[test]
fn test_layout_json_livecode() {
    let output = canvas_probe()
        .args([
            "layout", "--profile", "livecode", "--width", "320", "--height", "480", "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["profile"], "livecode");
    assert_eq!(doc["canvas"]["width"], 320);
    let btn_0 = doc["elements"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"] == "btn_0")
        .unwrap();
    assert_eq!(btn_0["rect"]["x"], 0);
    assert_eq!(btn_0["rect"]["y"], 400);
    assert_eq!(btn_0["rect"]["width"], 160);
}

#[test]
fn test_layout_unknown_profile() {
    canvas_probe()
        .args(["layout", "--profile", "desk", "--width", "1", "--height", "1"])
        .assert()
        .failure();
}

// ============================================================================
// config
// ============================================================================

#[test]
fn test_config_prints_yaml() {
    canvas_probe()
        .args(["config", "--profile", "livecode"])
        .assert()
        .success()
        .stdout(predicate::str::contains("profile: livecode"))
        .stdout(predicate::str::contains("settle_delay_ms"));
}

#[test]
fn test_config_write_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("probe.yaml");

    canvas_probe()
        .args(["config", "--profile", "livecode", "--write"])
        .arg(&path)
        .assert()
        .success();
    assert!(fs::read_to_string(&path).unwrap().contains("livecode"));

    canvas_probe()
        .args(["layout", "--width", "320", "--height", "480", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("(0, 400)"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("probe.yaml");
    fs::write(&path, "poll_interval_ms: 0\n").unwrap();

    canvas_probe()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_unknown_config_field_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("probe.yaml");
    fs::write(&path, "colour: blue\n").unwrap();

    canvas_probe()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .failure();
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_unknown_scenario() {
    canvas_probe()
        .args(["run", "--scenario", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scenario 'nope'"));
}

#[test]
fn test_run_launch_failure_exits_cleanly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("probe.yaml");
    let missing = dir.path().join("no-such-chromium");
    fs::write(
        &path,
        format!("browser:\n  chromium_path: {}\n", missing.display()),
    )
    .unwrap();

    canvas_probe()
        .args(["run", "--scenario", "clear", "--config"])
        .arg(&path)
        .timeout(std::time::Duration::from_secs(60))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to launch browser"));
}
