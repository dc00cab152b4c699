//! CLI integration tests for fixgen
//!
//! Tests command parsing, config handling, and a fill/verify round through
//! the builtin EOF validator.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Minimal valid container: one code section holding STOP
const VALID_CONTAINER: &str = "0xef00010100040200010001ff0000000080000000";

/// Helper to run the CLI with arguments
fn run_fixgen(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_fixgen"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

/// Empty config file so the user's own config never leaks into a test
fn empty_config(dir: &Path) -> String {
    let path = dir.join("config.toml");
    fs::write(&path, "").unwrap();
    path.to_string_lossy().into_owned()
}

fn write_eof_spec(dir: &Path) -> String {
    let path = dir.join("eof_spec.json");
    let spec = serde_json::json!({
        "valid_stop": {
            "networks": ["Osaka"],
            "spec": {
                "type": "EOFTest",
                "vectors": [
                    { "code": VALID_CONTAINER },
                    { "code": "0xef0002", "expectException": "EOFException.INVALID_VERSION" }
                ]
            }
        }
    });
    fs::write(&path, serde_json::to_string_pretty(&spec).unwrap()).unwrap();
    path.to_string_lossy().into_owned()
}

// ==================== Help & Version Tests ====================

#[test]
fn test_cli_help() {
    let output = run_fixgen(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fixgen"));
    assert!(stdout.contains("fill"));
    assert!(stdout.contains("verify"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_cli_version() {
    let output = run_fixgen(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fixgen"));
}

#[test]
fn test_cli_fill_help() {
    let output = run_fixgen(&["fill", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--t8n"));
    assert!(stdout.contains("--pre-alloc-groups"));
    assert!(stdout.contains("--stop-on-first-error"));
}

#[test]
fn test_cli_missing_subcommand() {
    let output = run_fixgen(&[]);
    assert!(!output.status.success());
}

// ==================== Config Tests ====================

#[test]
fn test_config_show_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "chain_id = 7\nworkers = 3\n").unwrap();

    let output = run_fixgen(&["--json", "--config", path.to_str().unwrap(), "config"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["config"]["chain_id"], 7);
    assert_eq!(value["config"]["workers"], 3);
    assert_eq!(value["config"]["t8n"]["client"], "geth");
}

#[test]
fn test_config_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "chain_id = \"not a number\"\n").unwrap();

    let output = run_fixgen(&["--config", path.to_str().unwrap(), "config"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Config error"));
}

#[test]
fn test_config_missing_explicit_file() {
    let output = run_fixgen(&["--json", "--config", "/nonexistent/fixgen.toml", "config"]);
    assert!(!output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["success"], false);
}

// ==================== Verify Tests ====================

#[test]
fn test_verify_empty_dir() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());
    let fixtures = dir.path().join("fixtures");
    fs::create_dir(&fixtures).unwrap();

    let output = run_fixgen(&["--json", "--config", &config, "verify", fixtures.to_str().unwrap()]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["files"], 0);
    assert_eq!(value["fixtures"], 0);
}

#[test]
fn test_verify_missing_dir() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());
    let missing = dir.path().join("missing");

    let output = run_fixgen(&["--config", &config, "verify", missing.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a directory"));
}

#[test]
fn test_verify_reports_broken_file() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());
    let fixtures = dir.path().join("fixtures");
    fs::create_dir_all(fixtures.join("state_tests")).unwrap();
    fs::write(fixtures.join("state_tests/broken.json"), "{ not json").unwrap();

    let output = run_fixgen(&["--json", "--config", &config, "verify", fixtures.to_str().unwrap()]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first: serde_json::Value = serde_json::Deserializer::from_str(&stdout)
        .into_iter()
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(first["files"], 1);
    assert_eq!(first["failures"].as_array().unwrap().len(), 1);
    assert!(first["failures"][0]["test"].is_null());
}

// ==================== Fill Tests ====================

#[test]
fn test_fill_requires_transition_tool() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());
    let spec = write_eof_spec(dir.path());

    let output = run_fixgen(&["--config", &config, "fill", &spec]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no transition tool"));
}

#[test]
fn test_fill_no_spec_files() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());
    let empty = dir.path().join("specs");
    fs::create_dir(&empty).unwrap();

    let output = run_fixgen(&[
        "--config",
        &config,
        "fill",
        empty.to_str().unwrap(),
        "--t8n",
        "/nonexistent/evm",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no spec files"));
}

#[test]
fn test_fill_then_verify_eof_fixtures() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());
    let spec = write_eof_spec(dir.path());
    let out = dir.path().join("out");

    // EOF tests never reach the transition tool, so a missing binary is fine
    let output = run_fixgen(&[
        "--json",
        "--log-level",
        "warn",
        "--config",
        &config,
        "fill",
        &spec,
        "--t8n",
        "/nonexistent/evm",
        "--output",
        out.to_str().unwrap(),
        "--workers",
        "1",
    ]);
    assert!(
        output.status.success(),
        "fill failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["filled"], 1);
    assert_eq!(value["failed"], 0);

    let written = out.join("eof_tests").join("eof_spec.json");
    let fixtures: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&written).unwrap()).unwrap();
    let fixture = &fixtures["valid_stop[fork_Osaka-eof_test]"];
    assert_eq!(fixture["vectors"]["0"]["results"]["Osaka"]["result"], true);
    assert_eq!(fixture["vectors"]["1"]["results"]["Osaka"]["result"], false);
    assert!(out.join("index.json").exists());

    let output = run_fixgen(&["--json", "--config", &config, "verify", out.to_str().unwrap()]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["files"], 1);
    assert_eq!(value["fixtures"], 1);
}
