//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary HOME so the
//! database starts empty.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_salaryflow"))
        .args(args)
        .env("HOME", home)
        .env_remove("SALARYFLOW_ENV")
        .env_remove("SALARYFLOW_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_calc_reports_rates() {
    let home = tempfile::tempdir().unwrap();
    let out = run_json(home.path(), &["calc", "365,000", "--no-start"]);
    assert_eq!(out["workingDays"], 246);
    assert_eq!(out["currency"], "CNY");
    assert_eq!(out["state"], "idle");
    let per_second = out["perSecond"].as_f64().unwrap();
    assert!((per_second - 0.051_5).abs() < 1e-3);
}

#[test]
fn test_calc_rejects_bad_salary() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["calc", "abc"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_timer_lifecycle_persists_between_runs() {
    let home = tempfile::tempdir().unwrap();
    run_json(home.path(), &["calc", "120000", "--period", "month", "--currency", "usd"]);

    let status = run_json(home.path(), &["timer", "status"]);
    assert_eq!(status["snapshot"]["state"], "running");
    assert_eq!(status["snapshot"]["currency"], "USD");
    assert_eq!(status["snapshot"]["salary"]["amount"], 120000.0);
    assert_eq!(status["snapshot"]["salary"]["period"], "month");

    let paused = run_json(home.path(), &["timer", "pause"]);
    assert_eq!(paused["type"], "TimerPaused");

    let reset = run_json(home.path(), &["timer", "reset"]);
    assert_eq!(reset["type"], "TimerReset");
    let status = run_json(home.path(), &["timer", "status"]);
    assert_eq!(status["snapshot"]["state"], "idle");
    assert_eq!(status["snapshot"]["elapsed_ms"], 0);
}

#[test]
fn test_records_add_list_delete() {
    let home = tempfile::tempdir().unwrap();
    run_json(home.path(), &["calc", "365000"]);

    let first = run_json(home.path(), &["record", "add"]);
    let second = run_json(home.path(), &["record", "add"]);
    let list = run_json(home.path(), &["record", "list"]);
    let rows = list.as_array().unwrap();
    assert_eq!(rows.len(), 2);

    let id = second["id"].as_str().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["record", "delete", id]);
    assert_eq!(code, 0);
    assert!(stdout.contains(id));

    let latest = run_json(home.path(), &["record", "latest"]);
    let latest = latest.as_array().unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0]["id"], first["id"]);

    let (stdout, stderr, code) = run_cli(home.path(), &["record", "delete", "missing"]);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.contains("no record with id missing"));
    let list = run_json(home.path(), &["record", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[test]
fn test_record_export_writes_csv() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["record", "export"]);
    assert_eq!(code, 1, "empty export should fail");
    assert!(stderr.contains("error:"));

    run_json(home.path(), &["calc", "365000"]);
    run_json(home.path(), &["record", "add"]);
    let target = home.path().join("out.csv");
    let (stdout, _, code) = run_cli(
        home.path(),
        &["record", "export", "--output", target.to_str().unwrap()],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("out.csv"));

    let csv = std::fs::read_to_string(&target).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("时间,金额,货币,持续时间(秒),收益增量"));
    assert!(lines.next().unwrap().contains(",CNY,"));
}

#[test]
fn test_prefs_get_set_reset() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["prefs", "get", "work.daysPerWeek"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "5");

    let (_, _, code) = run_cli(home.path(), &["prefs", "set", "work.daysPerWeek", "6"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["prefs", "get", "work.daysPerWeek"]);
    assert_eq!(stdout.trim(), "6");

    let (_, stderr, code) = run_cli(home.path(), &["prefs", "set", "work.daysPerWeek", "8"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(home.path(), &["prefs", "get", "nope"]);
    assert_eq!(code, 1);

    run_cli(home.path(), &["prefs", "reset"]);
    let prefs = run_json(home.path(), &["prefs", "list"]);
    assert_eq!(prefs["work"]["daysPerWeek"], 5);
}

#[test]
fn test_theme_toggle() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, _) = run_cli(home.path(), &["theme", "show"]);
    assert_eq!(stdout.trim(), "light");
    let (stdout, _, _) = run_cli(home.path(), &["theme", "toggle"]);
    assert_eq!(stdout.trim(), "dark");
    let (stdout, _, _) = run_cli(home.path(), &["theme", "show"]);
    assert_eq!(stdout.trim(), "dark");
    let (_, _, code) = run_cli(home.path(), &["theme", "set", "sepia"]);
    assert_eq!(code, 1);
}

#[test]
fn test_rates_show_and_convert() {
    let home = tempfile::tempdir().unwrap();
    let rates = run_json(home.path(), &["rates", "show"]);
    assert_eq!(rates["rates"]["CNY"], 1.0);
    assert_eq!(rates["stale"], true);

    let converted = run_json(home.path(), &["rates", "convert", "100", "CNY", "USD"]);
    let amount = converted["amount"].as_f64().unwrap();
    assert!((amount - 13.94).abs() < 1e-9);
    assert_eq!(converted["display"], "$ 13.94");

    let (_, _, code) = run_cli(home.path(), &["rates", "convert", "1", "CNY", "BTC"]);
    assert_eq!(code, 1);
}

#[test]
fn test_rates_update_respects_offline_mode() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["prefs", "set", "exchangeRate.offlineMode", "true"]);
    let (_, stderr, code) = run_cli(home.path(), &["rates", "update"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}
