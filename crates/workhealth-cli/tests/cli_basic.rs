//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with an isolated data directory and verify
//! outputs.

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Run a CLI command against `data_dir` and return (stdout, stderr, code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_workhealth"))
        .args(args)
        .env("WORKHEALTH_DATA_DIR", data_dir)
        .env_remove("WORKHEALTH_GOOGLE_TOKEN")
        .env_remove("WORKHEALTH_INSIGHTS_API_KEY")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

const EVENTS_PAGE: &str = r#"{
  "items": [
    {
      "id": "a",
      "summary": "Planning",
      "start": { "dateTime": "2024-03-04T09:00:00Z" },
      "end": { "dateTime": "2024-03-04T10:00:00Z" }
    },
    {
      "id": "b",
      "summary": "Sync",
      "start": { "dateTime": "2024-03-04T10:05:00Z" },
      "end": { "dateTime": "2024-03-04T11:00:00Z" }
    },
    {
      "id": "c",
      "summary": "Review",
      "start": { "dateTime": "2024-03-04T14:00:00Z" },
      "end": { "dateTime": "2024-03-04T15:30:00Z" }
    },
    {
      "id": "d",
      "summary": "Offsite",
      "start": { "date": "2024-03-04" },
      "end": { "date": "2024-03-05" }
    }
  ]
}"#;

#[test]
fn test_analyze_demo_day() {
    let dir = TempDir::new().unwrap();
    let metrics = run_json(dir.path(), &["analyze", "--date", "2024-03-04"]);

    assert_eq!(metrics["schedule"]["meetingCount"], 5);
    let index = metrics["adaptivePerformanceIndex"].as_u64().unwrap();
    assert!((10..=100).contains(&index));
    assert!(metrics["status"].is_string());
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_analyze_from_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("events.json");
    std::fs::write(&file, EVENTS_PAGE).unwrap();

    let metrics = run_json(
        dir.path(),
        &["analyze", "--date", "2024-03-04", "--file", file.to_str().unwrap()],
    );

    assert_eq!(metrics["schedule"]["meetingCount"], 3);
    assert_eq!(metrics["schedule"]["backToBackCount"], 1);
    assert_eq!(metrics["cognitiveLoad"], 44);
    assert_eq!(metrics["schedule"]["fragmentationScore"], 47);
    assert_eq!(metrics["adaptivePerformanceIndex"], 58);
    assert_eq!(metrics["status"], "MODERATE");
}

#[test]
fn test_analyze_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["analyze", "--file", dir.path().join("nope.json").to_str().unwrap()],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_report_without_generator_uses_fallback() {
    let dir = TempDir::new().unwrap();
    let report = run_json(
        dir.path(),
        &["report", "--tab", "resilience", "--date", "2024-03-04"],
    );

    assert_eq!(report["origin"], "fallback");
    assert_eq!(report["tab"], "resilience");
    assert_eq!(report["cacheKey"].as_str().unwrap().len(), 64);
    assert_eq!(
        report["insights"]["overallScore"],
        report["metrics"]["cognitiveResilience"]
    );
    assert_eq!(report["events"].as_array().unwrap().len(), 5);
}

#[test]
fn test_report_rejects_unknown_tab() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["report", "--tab", "wellness"]);
    assert_eq!(code, 2);
}

#[test]
fn test_cache_key_is_stable_per_tab() {
    let dir = TempDir::new().unwrap();
    let args = ["cache-key", "--date", "2024-03-04", "--tab", "overview"];
    let (first, _, code) = run_cli(dir.path(), &args);
    assert_eq!(code, 0);
    let (second, _, _) = run_cli(dir.path(), &args);
    assert_eq!(first, second);
    assert_eq!(first.trim().len(), 64);

    let (other, _, _) = run_cli(
        dir.path(),
        &["cache-key", "--date", "2024-03-04", "--tab", "performance"],
    );
    assert_ne!(first, other);
}

#[test]
fn test_cache_show_and_clear_on_empty_cache() {
    let dir = TempDir::new().unwrap();
    let entries = run_json(dir.path(), &["cache", "show"]);
    assert_eq!(entries, Value::Array(vec![]));

    let (stdout, _, code) = run_cli(dir.path(), &["cache", "clear"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("removed 0"));
}

#[test]
fn test_config_get_set_reset() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "user.timezone"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "UTC");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "user.timezone", "Europe/Berlin"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "user.timezone"]);
    assert_eq!(stdout.trim(), "Europe/Berlin");

    let (_, _, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let config = run_json(dir.path(), &["config", "show"]);
    assert_eq!(config["user"]["timezone"], "UTC");
}

#[test]
fn test_config_rejects_bad_values() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "user.nope", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "cache.ttl_hours", "8"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("cache.ttl_hours"));
}
