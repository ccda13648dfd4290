use assert_cmd::Command;
use predicates::prelude::*;
use std::io::{Read, Write};
use std::process::Stdio;
use std::thread;
use std::time::{Duration, Instant};

fn cargo_bin() -> Command {
    Command::cargo_bin("bf").unwrap()
}

fn infinite_bf() -> &'static str {
    "+[]" // increments to 1, then [] does nothing forever (infinite loop)
}

fn write_tempfile(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn test_run_timeout_infinite_flag() {
    let tf = write_tempfile(infinite_bf());
    cargo_bin()
        .arg("run").arg("--timeout").arg("100").arg("--file").arg(tf.path())
        .timeout(Duration::from_secs(5))
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_run_step_limit_infinite_flag() {
    let tf = write_tempfile(infinite_bf());
    cargo_bin()
        .arg("run").arg("--max-steps").arg("50").arg("--file").arg(tf.path())
        .timeout(Duration::from_secs(5))
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (50)"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_step_limit_from_env() {
    cargo_bin()
        .env("BF_MAX_STEPS", "50")
        .env_remove("BF_TIMEOUT_MS")
        .args(["run", infinite_bf()])
        .timeout(Duration::from_secs(5))
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (50)"));
}

#[test]
fn test_flag_beats_env_limit() {
    cargo_bin()
        .env("BF_MAX_STEPS", "5")
        .args(["run", "--max-steps", "1000", "++++++++++[-]"])
        .timeout(Duration::from_secs(5))
        .assert()
        .success();
}

#[test]
fn test_repl_bare_timeout_infinite() {
    // Pipe infinite program to stdin so auto-bare triggers
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env_remove("BF_MAX_STEPS")
        .env("BF_TIMEOUT_MS", "100")
        .write_stdin(infinite_bf())
        .assert()
        .success()
        .stderr(predicate::str::contains("Execution aborted").and(predicate::str::contains("timeout")))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_run_timeout_covers_open_stdin() {
    // stdin stays open and silent, so reading input for `,` never finishes
    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("bf"))
        .args(["run", "--timeout", "100", ",."])
        .env_remove("BF_MAX_STEPS")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn bf");
    let _stdin = child.stdin.take();

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait().expect("wait bf") {
            break status;
        }
        if started.elapsed() > Duration::from_secs(5) {
            let _ = child.kill();
            panic!("bf did not time out while stdin was open");
        }
        thread::sleep(Duration::from_millis(20));
    };

    let mut stderr = String::new();
    child.stderr.take().expect("stderr").read_to_string(&mut stderr).unwrap();
    assert!(!status.success());
    assert!(stderr.contains("timeout"), "stderr was: {stderr}");
}

#[test]
fn test_oversized_memory_flag_is_usage_error() {
    cargo_bin()
        .args(["run", "--memory-size", "18446744073709551615", "+."])
        .timeout(Duration::from_secs(5))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("memory size must be at most"));
}

#[test]
fn test_oversized_memory_env_falls_back_to_default() {
    cargo_bin()
        .env("BF_MEMORY_SIZE", "18446744073709551615")
        .args(["run", "--dump", "+"])
        .timeout(Duration::from_secs(5))
        .assert()
        .success()
        .stderr(predicate::str::contains("ignoring invalid config value"));
}
