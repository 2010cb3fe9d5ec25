//! CLI arg tests for jarvys_interface (server)
use assert_cmd::prelude::*;
use std::process::Command;

#[test]
fn test_port_short_and_long_accepted() {
    // We verify port flags are accepted by ensuring the process starts (then we kill quickly).
    // Use unlikely ports to avoid conflicts.
    let mut child = Command::cargo_bin("jarvys_interface")
        .expect("binary exists")
        .args(["--port", "19555"])
        .spawn()
        .expect("spawn interface");
    std::thread::sleep(std::time::Duration::from_millis(200));
    let _ = child.kill();
    let _ = child.wait();

    let mut child2 = Command::cargo_bin("jarvys_interface")
        .expect("binary exists")
        .args(["-p", "19556"])
        .spawn()
        .expect("spawn interface");
    std::thread::sleep(std::time::Duration::from_millis(200));
    let _ = child2.kill();
    let _ = child2.wait();
}
