//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with HOME pointed at a temporary directory,
//! so preferences never touch the real user config.

use std::io::Write;
use std::process::{Command, Stdio};

/// Run a CLI command and return (code, stdout, stderr).
fn run_cli(home: &std::path::Path, args: &[&str], stdin: &str) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_circuitroom"))
        .args(args)
        .env("HOME", home)
        .env_remove("CIRCUITROOM_ENV")
        .env_remove("CIRCUITROOM_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait for CLI");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("JSON line"))
        .collect()
}

fn event_types(lines: &[serde_json::Value]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|l| l["event"]["type"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn test_simulate_short_workout_json() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(
        home.path(),
        &[
            "simulate", "--stations", "2", "--rounds", "1", "--train", "10", "--swap", "5",
            "--rest", "0", "--json",
        ],
        "",
    );
    assert_eq!(code, 0, "simulate failed");

    let lines = json_lines(&stdout);
    assert_eq!(
        event_types(&lines),
        vec![
            "WorkoutStarted",
            "PhaseChanged",
            "PhaseChanged",
            "PhaseChanged",
            "PhaseChanged",
            "WorkoutCompleted",
        ]
    );
    let last = lines.last().unwrap();
    assert_eq!(last["tick"], 35);

    let go_cues = lines.iter().filter(|l| l["cue"]["cue"] == "go").count();
    assert_eq!(go_cues, 1);
}

#[test]
fn test_simulate_clamps_garbage_input() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(
        home.path(),
        &[
            "simulate", "--stations", "lots", "--rounds", "0", "--train", "1", "--swap", "1",
            "--rest", "-4", "--json",
        ],
        "",
    );
    assert_eq!(code, 0, "simulate failed");
    let lines = json_lines(&stdout);
    let done = lines
        .iter()
        .find(|l| l["event"]["type"] == "WorkoutCompleted")
        .expect("completion event");
    assert_eq!(done["event"]["stations"], 2);
    assert_eq!(done["event"]["rounds"], 1);
}

#[test]
fn test_simulate_text_output() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(
        home.path(),
        &["simulate", "--stations", "2", "--rounds", "1", "--language", "en"],
        "",
    );
    assert_eq!(code, 0, "simulate failed");
    assert!(stdout.contains("training -> swap"));
    assert!(stdout.contains("\"Workout complete.\""));
    assert!(stdout.contains("total:"));
}

#[test]
fn test_simulate_rejects_unknown_language() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["simulate", "--language", "fr"], "");
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_get_default() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "cues.voice"], "");
    assert_eq!(code, 0, "Config get failed");
    assert_eq!(stdout.trim(), "true");
}

#[test]
fn test_config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(home.path(), &["config", "set", "workout.rounds_total", "4"], "");
    assert_eq!(code, 0, "Config set failed");
    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "workout.rounds_total"], "");
    assert_eq!(code, 0, "Config get failed");
    assert_eq!(stdout.trim(), "4");
}

#[test]
fn test_config_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["config", "get", "cues.whistle"], "");
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_config_list() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["config", "list"], "");
    assert_eq!(code, 0, "Config list failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(json.get("workout").is_some());
    assert!(json.get("cues").is_some());
    assert!(json.get("display").is_some());
}

#[test]
fn test_run_quits_on_command() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(
        home.path(),
        &["run", "--mute", "--language", "en"],
        "set train 30\nquit\n",
    );
    assert_eq!(code, 0, "run failed");
    assert!(stdout.contains("Ready"));
    assert!(stdout.contains("00:30"));
}
