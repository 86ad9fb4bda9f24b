/// Black-box tests for the Driftlog CLI.
/// Each test spawns the binary with a temp store, pipes commands via
/// stdin, and asserts on stdout.
use std::path::Path;
use tempfile::tempdir;

/// Helper to run CLI commands and capture output
fn run_cli(dir: &Path, extra_env: &[(&str, &str)], commands: &str) -> String {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let mut cmd = Command::new("cargo");
    cmd.args(["run", "-p", "cli", "--"])
        .env("DRIFTLOG_DIR", dir.to_str().unwrap())
        .env("DRIFTLOG_FORMAT", "flat")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in extra_env {
        cmd.env(key, value);
    }
    let mut child = cmd.spawn().expect("Failed to spawn CLI");

    {
        let stdin = child.stdin.as_mut().expect("Failed to open stdin");
        stdin
            .write_all(commands.as_bytes())
            .expect("Failed to write to stdin");
        stdin.write_all(b"EXIT\n").expect("Failed to write EXIT");
    }

    let output = child.wait_with_output().expect("Failed to read output");
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_add_and_count() {
    let dir = tempdir().unwrap();
    let output = run_cli(dir.path(), &[], "ADD info hello there\nCOUNT\n");

    assert!(output.contains("OK "));
    // COUNT prints the bare number after the prompt.
    assert!(output.contains("> 1"));
}

#[test]
fn test_add_and_find() {
    let dir = tempdir().unwrap();
    let output = run_cli(
        dir.path(),
        &[],
        "ADD info portal opened\nADD error portal exploded\nFIND exploded\n",
    );

    assert!(output.contains("portal exploded"));
    assert!(output.contains("(1 records)"));
}

#[test]
fn test_first_and_last_windows() {
    let dir = tempdir().unwrap();
    let commands = "ADD info one\nADD info two\nADD info three\nFIRST 1\nLAST 1\n";
    let output = run_cli(dir.path(), &[], commands);

    // FIRST 1 prints "one", LAST 1 prints "three"; both as single-record
    // result sets.
    assert!(output.contains(": one"));
    assert!(output.contains(": three"));
    assert_eq!(output.matches("(1 records)").count(), 2);
}

#[test]
fn test_where_filter() {
    let dir = tempdir().unwrap();
    let commands = "ADD error boom\nADD info fine\nWHERE type = error\n";
    let output = run_cli(dir.path(), &[], commands);

    assert!(output.contains(": boom"));
    assert!(output.contains("(1 records)"));
}

#[test]
fn test_del_is_zero() {
    let dir = tempdir().unwrap();
    let output = run_cli(dir.path(), &[], "ADD info keep me\nDEL\nCOUNT\n");

    assert!(output.contains("0 (the file store does not delete)"));
    assert!(output.contains("> 1"));
}

#[test]
fn test_unknown_type_coerces_to_other() {
    let dir = tempdir().unwrap();
    let output = run_cli(dir.path(), &[], "ADD shouting loudly\nWHERE type = other\n");

    // "shouting" is not a known type, so it is part of the message.
    assert!(output.contains(": shouting loudly"));
    assert!(output.contains("(1 records)"));
}

#[test]
fn test_flat_separator_mode_round_trips() {
    let dir = tempdir().unwrap();
    let output = run_cli(
        dir.path(),
        &[("DRIFTLOG_SEPARATOR", "|")],
        "ADD info piped record\nFIND piped\n",
    );

    assert!(output.contains(": piped record"));
    assert!(output.contains("(1 records)"));
}

#[test]
fn test_json_format_mode() {
    let dir = tempdir().unwrap();
    let output = run_cli(
        dir.path(),
        &[("DRIFTLOG_FORMAT", "json")],
        "ADD info pretty stored\nADD debug second one\nLAST 1\n",
    );

    assert!(output.contains(": second one"));
    assert!(output.contains("(1 records)"));
}

#[test]
fn test_store_survives_restart() {
    let dir = tempdir().unwrap();
    let first = run_cli(dir.path(), &[], "ADD info persisted\n");
    assert!(first.contains("OK "));

    let second = run_cli(dir.path(), &[], "COUNT\nFIND persisted\n");
    assert!(second.contains(": persisted"));
    assert!(second.contains("(1 records)"));
}

#[test]
fn test_unknown_command() {
    let dir = tempdir().unwrap();
    let output = run_cli(dir.path(), &[], "FROBNICATE\n");
    assert!(output.contains("ERR unknown command: FROBNICATE"));
}
