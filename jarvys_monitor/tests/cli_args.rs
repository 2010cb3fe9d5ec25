//! CLI arg parsing tests for jarvys_monitor (client)
use assert_cmd::prelude::*;
use std::process::Command;

#[test]
fn test_help_mentions_short_and_long_flags() {
    let output = Command::cargo_bin("jarvys_monitor")
        .expect("binary exists")
        .arg("--help")
        .output()
        .expect("run jarvys_monitor --help");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(
        text.contains("--token") && text.contains("-T") && text.contains("--once"),
        "help text missing expected flags (--token/-T, --once)\n{text}"
    );
}

#[test]
fn test_token_arg_long_and_short_parsed() {
    let out = Command::cargo_bin("jarvys_monitor")
        .expect("binary exists")
        .args(["--token", "secret", "--help"])
        .output()
        .expect("run jarvys_monitor");
    assert!(out.status.success());
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(text.contains("Usage:"));

    let out2 = Command::cargo_bin("jarvys_monitor")
        .expect("binary exists")
        .args(["-T", "secret", "--help"])
        .output()
        .expect("run jarvys_monitor");
    assert!(out2.status.success());
}
