// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI integration tests.
//!
//! These tests run the actual gliderproc binary and verify its behavior.

mod common;

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use common::DeploymentTree;
use gliderproc::{Mode, Stage};

/// Get the path to the built gliderproc binary
fn gliderproc_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    // The test binary is in target/debug/deps/
    // The gliderproc binary is in target/debug/
    path.pop(); // deps
    path.pop(); // debug or release
    path.push("gliderproc");
    path
}

/// Run gliderproc against a test data home with the given config
fn run_in(data_home: &Path, config: Option<&Path>, args: &[&str]) -> Output {
    let bin = gliderproc_bin();
    let mut cmd = Command::new(&bin);
    cmd.args(args)
        .env_remove("GLIDER_DATA_HOME")
        .env_remove("GLIDERPROC_CONFIG")
        .env("GLIDER_DATA_HOME_TEST", data_home)
        .env("HOME", data_home);
    if let Some(config) = config {
        cmd.env("GLIDERPROC_CONFIG", config);
    }
    cmd.output()
        .unwrap_or_else(|_| panic!("Failed to run {:?}", bin))
}

/// Run gliderproc without a data home
fn run(args: &[&str]) -> Output {
    let bin = gliderproc_bin();
    Command::new(&bin)
        .args(args)
        .env_remove("GLIDER_DATA_HOME")
        .env_remove("GLIDER_DATA_HOME_TEST")
        .env_remove("GLIDERPROC_CONFIG")
        .output()
        .unwrap_or_else(|_| panic!("Failed to run {:?}", bin))
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Glider binary to timeseries processing pipeline"));
    assert!(text.contains("locate"));
    assert!(text.contains("binary-to-rawnc"));
    assert!(text.contains("rawnc-to-timeseries"));
}

#[test]
fn test_cli_version() {
    let output = run(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("gliderproc"));
}

#[test]
fn test_stage_help_lists_flags() {
    let output = run(&["rawnc-to-timeseries", "--help"]);
    let text = stdout(&output);
    for flag in ["--mode", "--loglevel", "--test", "--config", "--grouping", "--csv"] {
        assert!(text.contains(flag), "missing {flag}");
    }
}

#[test]
fn test_deployments_required() {
    let output = run(&["binary-to-rawnc"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_mode_rejected() {
    let output = run(&["binary-to-rawnc", "ru39-20250423T1535", "-m", "recovered"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("recovered"));
}

#[test]
fn test_missing_data_home_is_fatal() {
    let output = run(&["binary-to-rawnc", "ru39-20250423T1535", "-t"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("GLIDER_DATA_HOME_TEST not set"));
}

// ============================================================================
// Locate Tests
// ============================================================================

#[test]
fn test_locate_json() {
    let tree = DeploymentTree::new("ru39-20250423T1535", Mode::Rt);
    let output = run_in(
        tree.data_home(),
        None,
        &["locate", "ru39-20250423T1535", "-t", "--json"],
    );

    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let entry = &value[0];
    assert_eq!(entry["deployment"], "ru39-20250423T1535");
    assert_eq!(entry["paths"]["mode"], "rt");
    assert!(entry["paths"]["binary_dir"]
        .as_str()
        .unwrap()
        .ends_with("data/in/binary/stbd"));
}

#[test]
fn test_locate_missing_exits_one() {
    let tree = DeploymentTree::new("ru39-20250423T1535", Mode::Rt);
    let output = run_in(
        tree.data_home(),
        None,
        &["locate", "ru39-20250423T1535", "ru40-20250101T0000", "-t"],
    );

    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("ru39-20250423T1535 (rt)"));
    assert!(text.contains("ru40-20250101T0000: Deployment location does not exist"));
}

// ============================================================================
// Stage Tests
// ============================================================================

#[test]
fn test_malformed_deployment_exits_one() {
    let tree = DeploymentTree::new("ru39-20250423T1535", Mode::Rt);
    let output = run_in(tree.data_home(), None, &["binary-to-rawnc", "ru39", "-t"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("ru39: skipped"));
    assert!(stderr(&output).contains("Cannot pull glider name from ru39"));
}

#[cfg(unix)]
#[test]
fn test_binary_stage_with_configured_decoder() {
    let tree = DeploymentTree::new("ru39-20250423T1535", Mode::Rt);
    tree.add_binary_pairs(2);
    let log_root = tree.data_home().join("base-logs");
    let config = tree.data_home().join("gliderproc.toml");
    std::fs::write(
        &config,
        format!(
            "log_root = {:?}\n\n[decode]\nprogram = \"true\"\nargs = []\n",
            log_root.to_string_lossy()
        ),
    )
    .unwrap();

    let output = run_in(
        tree.data_home(),
        Some(&config),
        &["binary-to-rawnc", "ru39-20250423T1535", "-t", "-l", "debug"],
    );

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("ru39-20250423T1535: completed (4 in, 0 out)"));
    assert!(tree
        .read_log(Stage::BinaryToRawnc)
        .contains("Successfully converted 0 of 2 science binary files with suffix *.tbd"));

    let base_logs: Vec<_> = std::fs::read_dir(&log_root).unwrap().collect();
    assert_eq!(base_logs.len(), 1);
}
