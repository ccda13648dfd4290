use assert_cmd::Command;
use predicates::prelude::*;

fn make_cmd() -> Command {
    Command::cargo_bin("bf").expect("bf binary")
}

#[test]
fn repl_empty_stdin_exits_clean_and_quiet() {
    // In non-TTY (piped) stdin, the REPL auto-selects bare mode and prints no prompt.
    make_cmd()
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn repl_valid_program_outputs_and_exits() {
    let program = format!("{}.", "+".repeat(65)); // 'A'
    make_cmd()
        .env("BF_REPL_ONCE", "1")
        .write_stdin(program)
        .assert()
        .success()
        .stdout("A\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn repl_multi_line_submission_runs_as_one_program() {
    make_cmd()
        .write_stdin("+++\n>+++\n[<+>-]<.\n")
        .assert()
        .success()
        .stdout("\u{6}\n");
}

#[test]
fn repl_invalid_program_reports_error_and_exits_clean() {
    make_cmd()
        .write_stdin("]") // stray closing bracket is a parse error
        .assert()
        .success()
        .stderr(predicate::str::contains("Parse error: unmatched bracket"));
}

#[test]
fn repl_meta_only_input_runs_nothing() {
    make_cmd()
        .write_stdin(":exit\n")
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn repl_comma_reads_zero_in_bare_mode() {
    make_cmd()
        .args(["repl", "--bare"])
        .write_stdin("+,[+.]")
        .assert()
        .success()
        .stdout("\n");
}

#[test]
fn forced_editor_on_non_tty_errors() {
    make_cmd()
        .args(["repl", "--editor"])
        .write_stdin("+++.")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("stdin is not a TTY"));
}

#[test]
fn env_mode_respected_flags_override() {
    make_cmd()
        .env("BF_REPL_MODE", "editor")
        .args(["repl", "--bare"])
        .write_stdin("+++.")
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{3}"));
}

#[test]
fn invalid_env_mode_is_an_error() {
    make_cmd()
        .env("BF_REPL_MODE", "vim")
        .write_stdin("+++.")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid BF_REPL_MODE value"));
}
