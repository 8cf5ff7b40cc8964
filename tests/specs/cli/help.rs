//! CLI help output specs: verify usage text displays for the `grid`
//! operator CLI binary.

use assert_cmd::Command;

fn stdout_of(args: &[&str]) -> String {
    let output = Command::cargo_bin("grid").unwrap().args(args).output().unwrap();
    assert!(output.status.success(), "grid {args:?} did not exit successfully");
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn grid_no_args_shows_usage_and_exits_nonzero() {
    let assert = Command::cargo_bin("grid").unwrap().assert().failure();
    let output = assert.get_output();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage:"), "expected usage text in stderr, got: {stderr}");
}

#[test]
fn grid_help_shows_usage() {
    assert!(stdout_of(&["--help"]).contains("Usage:"));
}

#[test]
fn grid_task_help_shows_subcommands() {
    let stdout = stdout_of(&["task", "--help"]);
    assert!(stdout.contains("get"));
    assert!(stdout.contains("trigger"));
}

#[test]
fn grid_run_help_shows_subcommands() {
    let stdout = stdout_of(&["run", "--help"]);
    assert!(stdout.contains("get"));
    assert!(stdout.contains("cancel"));
}
