//! Basic CLI E2E tests.
//!
//! Tests invoke the compiled binary against an isolated data directory
//! per test and verify outputs and exit codes. Tests that assert on an
//! admission outcome tighten the pacing range to one minute and skip
//! the last minutes before UTC midnight, where even a one-minute slot
//! can land on the next day.

use std::path::Path;
use std::process::Command;

use chrono::Timelike;
use tempfile::TempDir;

/// Run a CLI command against `data_dir` and return output.
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_sendpace-cli"))
        .env("SENDPACE_DATA_DIR", data_dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn tighten_pacing(data_dir: &Path) {
    let (_, _, code) = run_cli(data_dir, &["config", "set", "pacing.min_gap_minutes", "1"]);
    assert_eq!(code, 0);
    let (_, _, code) = run_cli(data_dir, &["config", "set", "pacing.max_gap_minutes", "1"]);
    assert_eq!(code, 0);
}

/// True in the last minutes before UTC midnight, where even a
/// one-minute slot can land past the day boundary or two invocations
/// can straddle the rollover.
fn too_close_to_midnight() -> bool {
    let now = chrono::Utc::now();
    now.hour() == 23 && now.minute() >= 55
}

#[test]
fn test_config_list_shows_defaults() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["global_daily_cap"], 30);
    assert_eq!(parsed["pacing"]["min_gap_minutes"], 70);
    assert_eq!(parsed["pacing"]["max_gap_minutes"], 100);
    assert_eq!(parsed["mailboxes"].as_array().unwrap().len(), 3);
}

#[test]
fn test_config_get_set_roundtrip() {
    let dir = TempDir::new().unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "pacing.min_gap_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "70");

    let (stdout, _, code) = run_cli(
        dir.path(),
        &["config", "set", "pacing.min_gap_minutes", "75"],
    );
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "pacing.min_gap_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "75");
}

#[test]
fn test_config_get_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "pacing.bogus"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_config_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();

    run_cli(dir.path(), &["config", "set", "global_daily_cap", "5"]);
    let (stdout, _, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("reset"));

    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "global_daily_cap"]);
    assert_eq!(stdout.trim(), "30");
}

#[test]
fn test_queue_today_empty_initially() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["queue", "today"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "[]");
}

#[test]
fn test_send_submit_accepts_and_persists() {
    if too_close_to_midnight() {
        return;
    }
    let dir = TempDir::new().unwrap();
    tighten_pacing(dir.path());

    let (stdout, _, code) = run_cli(
        dir.path(),
        &[
            "send",
            "submit",
            "lead@example.org",
            "--subject",
            "Quick question",
            "--body",
            "Hi there",
        ],
    );
    assert_eq!(code, 0);

    let outcome: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcome["status"], "accepted");
    assert_eq!(outcome["mailbox"], "outreach1@example.com");
    assert!(outcome["scheduled_at"].is_string());

    let (stdout, _, code) = run_cli(dir.path(), &["queue", "today"]);
    assert_eq!(code, 0);
    let queue: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let entries = queue.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["recipient"], "lead@example.org");
    assert_eq!(entries[0]["subject"], "Quick question");
}

#[test]
fn test_second_send_chains_on_first_mailbox() {
    if too_close_to_midnight() {
        return;
    }
    let dir = TempDir::new().unwrap();
    tighten_pacing(dir.path());

    let (_, _, code) = run_cli(dir.path(), &["send", "submit", "a@example.org"]);
    assert_eq!(code, 0);
    let (_, _, code) = run_cli(dir.path(), &["send", "submit", "b@example.org"]);
    assert_eq!(code, 0);

    let (stdout, _, _) = run_cli(dir.path(), &["queue", "today"]);
    let queue: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let entries = queue.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["mailbox"], "outreach1@example.com");
    assert_eq!(entries[1]["mailbox"], "outreach1@example.com");
}

#[test]
fn test_global_cap_rejection_exits_zero() {
    if too_close_to_midnight() {
        return;
    }
    let dir = TempDir::new().unwrap();
    tighten_pacing(dir.path());
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "global_daily_cap", "1"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(dir.path(), &["send", "submit", "a@example.org"]);
    assert_eq!(code, 0);
    let outcome: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcome["status"], "accepted");

    // A turned-down request is a result, not a failure.
    let (stdout, _, code) = run_cli(dir.path(), &["send", "submit", "b@example.org"]);
    assert_eq!(code, 0);
    let outcome: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcome["status"], "rejected");
    assert_eq!(outcome["reason"], "DAILY_LIMIT_REACHED");
}

#[test]
fn test_blank_recipient_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["send", "submit", ""]);
    assert_eq!(code, 1);
    assert!(stderr.contains("recipient"));
}

#[test]
fn test_queue_due_respects_window() {
    if too_close_to_midnight() {
        return;
    }
    let dir = TempDir::new().unwrap();
    tighten_pacing(dir.path());

    let (_, _, code) = run_cli(dir.path(), &["send", "submit", "lead@example.org"]);
    assert_eq!(code, 0);

    // The committed slot sits one minute out.
    let (stdout, _, code) = run_cli(dir.path(), &["queue", "due", "--window", "5"]);
    assert_eq!(code, 0);
    let due: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(due.as_array().unwrap().len(), 1);

    let (stdout, _, code) = run_cli(dir.path(), &["queue", "due", "--window", "0"]);
    assert_eq!(code, 0);
    let due: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(due.as_array().unwrap().is_empty());
}

#[test]
fn test_queue_due_honors_explicit_anchor() {
    if too_close_to_midnight() {
        return;
    }
    let dir = TempDir::new().unwrap();
    tighten_pacing(dir.path());

    let (stdout, _, code) = run_cli(dir.path(), &["send", "submit", "lead@example.org"]);
    assert_eq!(code, 0);
    let outcome: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let slot = outcome["scheduled_at"].as_str().unwrap().to_string();

    // Anchored on the slot itself, a zero window still matches it.
    let (stdout, _, code) = run_cli(
        dir.path(),
        &["queue", "due", "--window", "0", "--at", &slot],
    );
    assert_eq!(code, 0);
    let due: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(due.as_array().unwrap().len(), 1);

    let (stdout, _, code) = run_cli(
        dir.path(),
        &["queue", "due", "--at", "2000-01-01T00:00:00Z"],
    );
    assert_eq!(code, 0);
    let due: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(due.as_array().unwrap().is_empty());
}

#[test]
fn test_queue_due_rejects_malformed_anchor() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["queue", "due", "--at", "yesterday"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid --at"));
}

#[test]
fn test_queue_due_rejects_oversized_window() {
    let dir = TempDir::new().unwrap();
    // A window wider than a day must come back as an error, not abort
    // on calendar arithmetic.
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["queue", "due", "--window", "160000000000000"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid due window"));
}

#[test]
fn test_completions_generate() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("sendpace-cli"));
}
