use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command { Command::cargo_bin("bf").unwrap() }

#[test]
fn test_unmatched_close_bracket_error() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).arg("run").arg("+]")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Parse error: unmatched bracket ']' at position 1"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_unmatched_open_bracket_error() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).arg("run").arg("[")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Parse error: unmatched bracket '['"));
}

#[test]
fn test_move_left_of_zero_is_runtime_error() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).arg("run").arg("+ c<")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Runtime error: data pointer out of bounds (ptr=-1) at position 3")
            .and(predicate::str::contains("   ^")));
}

#[test]
fn test_output_before_error_is_kept() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run").arg(format!("{}.<<", "+".repeat(66)))
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("B"))
        .stderr(predicate::str::contains("Runtime error"));
}
