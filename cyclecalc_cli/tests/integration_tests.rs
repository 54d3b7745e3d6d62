//! Integration tests for the cyclecalc binary.
//!
//! These tests verify end-to-end behavior including:
//! - Calculator output in text and JSON form
//! - Input validation and exit codes
//! - History recording and CSV export
//! - Cycle log persistence

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI command isolated to `dir` for both data and config
fn cli(dir: &Path) -> Command {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        fs::write(&config_path, "").expect("Failed to write config");
    }
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cyclecalc"));
    cmd.arg("--data-dir")
        .arg(dir.join("data"))
        .arg("--config")
        .arg(config_path);
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.arg("--json").assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is not JSON")
}

fn history_lines(dir: &Path) -> usize {
    fs::read_to_string(dir.join("data/history.jsonl"))
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("cyclecalc"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Fertility window and gestational age calculator",
        ));
}

#[test]
fn test_fertile_window_text() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["fertile", "--start", "2024-01-01", "--end", "2024-01-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ovulation:    2024-01-15"))
        .stdout(predicate::str::contains("2024-01-10 to 2024-01-16"))
        .stdout(predicate::str::contains("2024-01-29 to 2024-02-02"));
}

#[test]
fn test_fertile_window_json_and_history() {
    let temp_dir = setup_test_dir();

    let value = stdout_json(cli(temp_dir.path()).args([
        "fertile",
        "--start",
        "2024-01-01",
        "--end",
        "2024-01-05",
        "--cycle-length",
        "30",
    ]));

    assert_eq!(value["window"]["ovulation_day"], "2024-01-17");
    assert_eq!(value["window"]["next_period_start"], "2024-01-31");
    assert!(value.get("insights").is_none());

    assert_eq!(history_lines(temp_dir.path()), 1);
}

#[test]
fn test_dry_run_does_not_record() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["fertile", "--start", "2024-01-01", "--end", "2024-01-05", "--dry-run"])
        .assert()
        .success();

    assert!(!temp_dir.path().join("data/history.jsonl").exists());
}

#[test]
fn test_history_disabled_in_config() {
    let temp_dir = setup_test_dir();
    fs::write(temp_dir.path().join("config.toml"), "[history]\nrecord = false\n").unwrap();

    cli(temp_dir.path())
        .args(["gestation", "lmp", "--date", "2024-01-01", "--as-of", "2024-03-01"])
        .assert()
        .success();

    assert_eq!(history_lines(temp_dir.path()), 0);
}

#[test]
fn test_invalid_cycle_length_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args([
            "fertile",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-05",
            "--cycle-length",
            "50",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cycle_length"));

    assert_eq!(history_lines(temp_dir.path()), 0);
}

#[test]
fn test_unparsable_date_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["gestation", "lmp", "--date", "01/01/2024"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("lmp_date"));
}

#[test]
fn test_future_lmp_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["gestation", "lmp", "--date", "2999-01-01"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("must not be after"));
}

#[test]
fn test_gestation_lmp_json() {
    let temp_dir = setup_test_dir();

    let value = stdout_json(cli(temp_dir.path()).args([
        "gestation",
        "lmp",
        "--date",
        "2024-01-01",
        "--as-of",
        "2024-03-25",
    ]));

    let estimate = &value["estimate"];
    assert_eq!(estimate["due_date"], "2024-10-07");
    assert_eq!(estimate["first_trimester_end"], "2024-03-25");
    assert_eq!(estimate["weeks"], 12);
    assert_eq!(estimate["days"], 0);
    assert_eq!(estimate["current_trimester"], 1);
    assert_eq!(estimate["method"], "lmp");
    assert_eq!(value["development"]["week"], 12);
}

#[test]
fn test_gestation_ultrasound_matches_lmp() {
    let temp_dir = setup_test_dir();

    let usg = stdout_json(cli(temp_dir.path()).args([
        "gestation",
        "ultrasound",
        "--date",
        "2024-03-01",
        "--weeks",
        "8",
        "--days",
        "4",
        "--as-of",
        "2024-03-01",
    ]));
    // 2024-03-01 minus 60 days
    let lmp = stdout_json(cli(temp_dir.path()).args([
        "gestation",
        "lmp",
        "--date",
        "2024-01-01",
        "--as-of",
        "2024-03-01",
    ]));

    assert_eq!(usg["estimate"]["lmp_equivalent"], "2024-01-01");
    assert_eq!(usg["estimate"]["due_date"], lmp["estimate"]["due_date"]);
    assert_eq!(history_lines(temp_dir.path()), 2);
}

#[test]
fn test_gestation_transfer() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args([
            "gestation",
            "transfer",
            "--date",
            "2024-02-15",
            "--embryo-days",
            "5",
            "--as-of",
            "2024-02-15",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 weeks 5 days"))
        .stdout(predicate::str::contains("EmbryoTransfer"));
}

#[test]
fn test_gestation_transfer_rejects_day_four() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["gestation", "transfer", "--date", "2024-02-15", "--embryo-days", "4"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("embryo_days"));
}

#[test]
fn test_week_lookup_uses_nearest() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["week", "21"])
        .assert()
        .success()
        .stdout(predicate::str::contains("showing nearest"))
        .stdout(predicate::str::contains("Week 20"));
}

#[test]
fn test_care_lookup() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["care", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Glucose tolerance test"));

    cli(temp_dir.path()).args(["care", "4"]).assert().code(2);
}

#[test]
fn test_phase_by_name() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["phase", "ovulatory"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fertile phase"))
        .stdout(predicate::str::contains("egg white"));

    cli(temp_dir.path())
        .args(["phase", "unknown-phase"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown phase"));
}

#[test]
fn test_phase_on_date() {
    let temp_dir = setup_test_dir();

    let value = stdout_json(cli(temp_dir.path()).args([
        "phase",
        "--start",
        "2024-01-01",
        "--period-length",
        "5",
        "--on",
        "2024-01-20",
    ]));
    assert_eq!(value["phase"], "luteal");
    assert_eq!(value["date"], "2024-01-20");
}

#[test]
fn test_phase_without_inputs_needs_log() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("phase")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("record a cycle first"));
}

#[test]
fn test_cycles_feed_fertile_insights() {
    let temp_dir = setup_test_dir();

    for (start, length) in [("2023-10-01", "26"), ("2023-10-27", "28"), ("2023-11-24", "30")] {
        cli(temp_dir.path())
            .args([
                "cycles",
                "add",
                "--start",
                start,
                "--period-length",
                "5",
                "--cycle-length",
                length,
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cycle recorded"));
    }

    cli(temp_dir.path())
        .args(["cycles", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2023-10-27"));

    let value = stdout_json(cli(temp_dir.path()).args([
        "fertile",
        "--start",
        "2024-01-01",
        "--end",
        "2024-01-05",
        "--use-log",
        "--insights",
    ]));

    let variability = value["window"]["cycle_variability"].as_f64().unwrap();
    assert!(variability > 0.0);
    assert_eq!(value["insights"]["average_luteal_phase"], 14.0);
    assert!(value["insights"]["predicted_next_cycle_length"].as_f64().unwrap() > 28.0);
    // bounds are unaffected by variability
    assert_eq!(value["window"]["fertile_start"], "2024-01-10");
}

#[test]
fn test_phase_defaults_to_latest_logged_cycle() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args([
            "cycles",
            "add",
            "--start",
            "2024-01-01",
            "--period-length",
            "5",
            "--cycle-length",
            "28",
        ])
        .assert()
        .success();

    let value = stdout_json(cli(temp_dir.path()).args(["phase", "--on", "2024-01-12"]));
    assert_eq!(value["phase"], "fertile");
}

#[test]
fn test_history_list_and_export() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No calculations recorded"));

    cli(temp_dir.path())
        .args(["fertile", "--start", "2024-01-01", "--end", "2024-01-05"])
        .assert()
        .success();
    cli(temp_dir.path())
        .args(["gestation", "lmp", "--date", "2024-01-01", "--as-of", "2024-02-01"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fertile_window"))
        .stdout(predicate::str::contains("gestation_lmp"));

    let csv_path = temp_dir.path().join("export/history.csv");
    cli(temp_dir.path())
        .args(["history", "export", "--out"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 calculations"));

    let csv_content = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    assert!(csv_content.starts_with("id,kind,created_at,input_data,result_data"));

    // exporting again replaces the snapshot instead of appending to it
    cli(temp_dir.path())
        .args(["history", "export", "--out"])
        .arg(&csv_path)
        .assert()
        .success();
    let csv_content = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    assert_eq!(csv_content.lines().count(), 3);
}

#[test]
fn test_out_of_range_year_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args([
            "gestation",
            "ultrasound",
            "--date=-262143-01-01",
            "--weeks",
            "42",
            "--days",
            "6",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("year must be between"));

    assert_eq!(history_lines(temp_dir.path()), 0);
}
