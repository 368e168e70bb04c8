//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a throwaway data directory.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(dir: &TempDir, args: &[&str]) -> (String, String, i32) {
    run_cli_with_input(dir, args, "")
}

fn run_cli_with_input(dir: &TempDir, args: &[&str], input: &str) -> (String, String, i32) {
    run_cli_interactive(dir, args, &[(Duration::ZERO, input)])
}

/// Feed stdin in steps, waiting before each one.
fn run_cli_interactive(
    dir: &TempDir,
    args: &[&str],
    steps: &[(Duration, &str)],
) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_focusisland"))
        .args(args)
        .env("FOCUSISLAND_DATA_DIR", dir.path())
        .env_remove("FOCUSISLAND_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    let mut stdin = child.stdin.take().unwrap();
    for (wait, input) in steps {
        thread::sleep(*wait);
        stdin.write_all(input.as_bytes()).unwrap();
        stdin.flush().unwrap();
    }
    drop(stdin);
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

#[test]
fn test_plan_prints_sessions() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["plan", "--goal", "A:15", "--goal", "B:10"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("A, Session 1"));
    assert!(stdout.contains("13:00"));
    assert!(stdout.contains("total 50:00"));
}

#[test]
fn test_plan_json_uses_overrides() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(
        &dir,
        &["plan", "-g", "Write:60", "--focus", "30", "--json"],
    );
    assert_eq!(code, 0);
    let sessions: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let lengths: Vec<u64> = sessions
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["length_secs"].as_u64().unwrap())
        .collect();
    assert_eq!(lengths, vec![1800, 600, 1800, 1200]);
}

#[test]
fn test_plan_rejects_bad_goal() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&dir, &["plan", "--goal", "A:0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(&dir, &["plan", "--goal", "A:15", "--focus", "200"]);
    assert_eq!(code, 1);

    let (_, stderr, code) = run_cli(&dir, &["plan", "--goal", "A:4294967295"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("minutes"));
}

#[test]
fn test_settings_set_persists() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["settings", "get", "focus_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "20");

    let (_, _, code) = run_cli(&dir, &["settings", "set", "focus_minutes", "45"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&dir, &["settings", "get", "focus_minutes"]);
    assert_eq!(stdout.trim(), "45");

    let (_, _, code) = run_cli(&dir, &["settings", "set", "standard_break_minutes", "2"]);
    assert_eq!(code, 1);

    let (_, _, code) = run_cli(&dir, &["settings", "set", "scaling_factor", "0.9"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&dir, &["settings", "get", "scaling_factor"]);
    assert_eq!(stdout.trim(), "0.50");

    let (_, _, code) = run_cli(&dir, &["settings", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&dir, &["settings", "list"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["focusMinutes"], 20);
}

#[test]
fn test_config_roundtrip() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["config", "get", "save_debounce_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "100");

    let (_, _, code) = run_cli(&dir, &["config", "set", "auto_start_after_ack", "true"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&dir, &["config", "get", "auto_start_after_ack"]);
    assert_eq!(stdout.trim(), "true");

    let (_, _, code) = run_cli(&dir, &["config", "get", "no_such_key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_run_quits_on_q() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli_with_input(&dir, &["run", "--goal", "A:15"], "q\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("> A, Session 1 15:00"));
}

#[test]
fn test_run_applies_overrides_for_this_run_only() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli_with_input(
        &dir,
        &["run", "-g", "A:60", "--focus", "30", "--break", "5"],
        "q\n",
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("> A, Session 1 30:00"));

    let (stdout, _, _) = run_cli(&dir, &["settings", "get", "focus_minutes"]);
    assert_eq!(stdout.trim(), "20");

    let (_, stderr, code) =
        run_cli_with_input(&dir, &["run", "-g", "A:60", "--focus", "200"], "q\n");
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_run_counts_down_and_pauses() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli_interactive(
        &dir,
        &["run", "-g", "A:15", "--start"],
        &[
            (Duration::from_millis(2_500), "p\n"),
            // Nothing to acknowledge; the timer stays paused.
            (Duration::from_millis(1_500), "\n"),
            (Duration::from_millis(1_500), "q\n"),
        ],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("started 15:00"));
    assert!(stdout.contains("14:59"));
    let paused_at = stdout.find("paused").expect("pause line");
    assert!(!stdout[paused_at..].contains("started"));
}
