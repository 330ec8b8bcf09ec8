use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const RAW_CSV: &str = "\
LotArea,YearBuilt,YearRemodAdd,YrSold,OverallQual,OverallCond,SalePrice
8450,2003,2003,2008,7,5,208500
9600,1976,1976,2007,6,8,181500
11250,2001,2002,2008,7,5,223500
";

const RAW_CSV_BAD_YEAR: &str = "\
LotArea,YearBuilt,YearRemodAdd,YrSold,OverallQual,OverallCond,SalePrice
8450,2003,2003,2008,7,5,208500
9600,1776,1976,2007,6,8,181500
11250,2001,2002,2008,7,5,223500
";

const SETTINGS_YAML: &str = "current_year: 2010\n";

/// Helper to create a Command for the expectations binary
#[allow(deprecated)]
fn expectations() -> Command {
    Command::cargo_bin("expectations").expect("Failed to find expectations binary")
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

fn matrix_csv(rows: usize, poison: Option<&str>) -> String {
    let mut csv = String::from("feature_0,feature_1,feature_2\n");
    for r in 0..rows {
        let last = match poison {
            Some(value) if r == rows / 2 => value.to_string(),
            _ => format!("{}", r as f64 * 0.25),
        };
        csv.push_str(&format!("{},{},{}\n", r, r * 2, last));
    }
    csv
}

// ============================================================================
// validate command tests
// ============================================================================

#[test]
fn test_validate_raw_passes() {
    let dir = TempDir::new().unwrap();
    let data = write(&dir, "train.csv", RAW_CSV);
    let settings = write(&dir, "settings.yml", SETTINGS_YAML);

    expectations()
        .arg("validate")
        .arg(&data)
        .arg("--settings")
        .arg(&settings)
        .assert()
        .success()
        .stdout(predicate::str::contains("raw_housing_data"))
        .stdout(predicate::str::contains("Validation PASSED"))
        .stdout(predicate::str::contains("Rules evaluated: 23"));
}

#[test]
fn test_validate_raw_bad_year_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let data = write(&dir, "train.csv", RAW_CSV_BAD_YEAR);
    let settings = write(&dir, "settings.yml", SETTINGS_YAML);

    expectations()
        .arg("validate")
        .arg(&data)
        .arg("--settings")
        .arg(&settings)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Validation FAILED"))
        .stdout(predicate::str::contains("value_between:YearBuilt"))
        .stderr(predicate::str::contains("Raw data validation failed"));
}

#[test]
fn test_validate_json_output() {
    let dir = TempDir::new().unwrap();
    let data = write(&dir, "train.csv", RAW_CSV_BAD_YEAR);
    let settings = write(&dir, "settings.yml", SETTINGS_YAML);

    let output = expectations()
        .args(["validate", "--format", "json", "--settings"])
        .arg(&settings)
        .arg(&data)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["success"], false);
    assert_eq!(report["statistics"]["unsuccessful"], 1);
    assert_eq!(report["failed_rules"][0]["rule_kind"], "value_between");
    assert_eq!(report["failed_rules"][0]["target_columns"][0], "YearBuilt");
}

#[test]
fn test_validate_test_stage_ignores_target() {
    let dir = TempDir::new().unwrap();
    let without_target: String = RAW_CSV
        .lines()
        .map(|line| line.rsplit_once(',').map_or(line, |(head, _)| head))
        .collect::<Vec<_>>()
        .join("\n");
    let data = write(&dir, "test.csv", &without_target);
    let settings = write(&dir, "settings.yml", SETTINGS_YAML);

    expectations()
        .args(["validate", "--stage", "test", "--settings"])
        .arg(&settings)
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains("test_housing_data"));
}

#[test]
fn test_validate_preprocessed_nan_fails() {
    let dir = TempDir::new().unwrap();
    let clean = write(&dir, "clean.csv", &matrix_csv(12, None));
    let poisoned = write(&dir, "poisoned.csv", &matrix_csv(12, Some("inf")));

    expectations()
        .args(["validate", "--stage", "preprocessed", "--expected-features", "3"])
        .arg(&clean)
        .assert()
        .success();

    expectations()
        .args(["validate", "--stage", "preprocessed", "--expected-features", "3"])
        .arg(&poisoned)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("missing or non-finite"));
}

#[test]
fn test_validate_monitor_never_fails() {
    let dir = TempDir::new().unwrap();
    let data = write(
        &dir,
        "request.csv",
        "LotArea,YearBuilt,OverallQual,OverallCond\n-5,3000,excellent,\n",
    );

    expectations()
        .args(["validate", "--stage", "monitor"])
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains("api_housing_data"))
        .stdout(predicate::str::contains("Validation FAILED"));
}

#[test]
fn test_validate_sample() {
    let dir = TempDir::new().unwrap();
    let data = write(&dir, "train.csv", RAW_CSV_BAD_YEAR);
    let settings = write(&dir, "settings.yml", SETTINGS_YAML);

    // The bad year is on the second row
    expectations()
        .args(["validate", "--sample", "1", "--settings"])
        .arg(&settings)
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 rows"));
}

#[test]
fn test_validate_unknown_stage() {
    let dir = TempDir::new().unwrap();
    let data = write(&dir, "train.csv", RAW_CSV);

    expectations()
        .args(["validate", "--stage", "staging"])
        .arg(&data)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown stage 'staging'"));
}

#[test]
fn test_validate_missing_file() {
    expectations()
        .args(["validate", "nonexistent.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load data file"));
}

// ============================================================================
// run command tests
// ============================================================================

#[test]
fn test_run_custom_suite() {
    let dir = TempDir::new().unwrap();
    let data = write(&dir, "train.csv", RAW_CSV);
    let suite = write(
        &dir,
        "suite.yml",
        r#"
name: quality_only
rules:
  - type: value_between
    column: OverallQual
    min: 1
    max: 6
    mostly: 0.3
  - type: column_pair_gte
    column_a: YrSold
    column_b: YearRemodAdd
"#,
    );

    expectations()
        .arg("run")
        .arg(&suite)
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains("quality_only"))
        .stdout(predicate::str::contains("Validation PASSED"));
}

#[test]
fn test_run_failing_toml_suite() {
    let dir = TempDir::new().unwrap();
    let data = write(&dir, "train.csv", RAW_CSV);
    let suite = write(
        &dir,
        "suite.toml",
        r#"
name = "strict_columns"

[[rules]]
type = "column_set_match"
columns = ["LotArea", "YearBuilt"]
mode = "exact"
"#,
    );

    expectations()
        .arg("run")
        .arg(&suite)
        .arg(&data)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Suite 'strict_columns' failed"));
}

#[test]
fn test_run_broken_suite_is_internal_error() {
    let dir = TempDir::new().unwrap();
    let data = write(&dir, "train.csv", RAW_CSV);
    let suite = write(
        &dir,
        "suite.yml",
        "name: broken\nrules:\n  - type: custom_predicate\n    predicate: nope\n    column: LotArea\n",
    );

    expectations()
        .arg("run")
        .arg(&suite)
        .arg(&data)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Internal validation error"));
}

// ============================================================================
// suite command tests
// ============================================================================

#[test]
fn test_suite_lists_raw_rules() {
    expectations()
        .args(["suite", "raw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("value_between:LotArea"))
        .stdout(predicate::str::contains("mostly 0.95"))
        .stdout(predicate::str::contains("column_pair_gte:YrSold,YearRemodAdd"))
        .stdout(predicate::str::contains("23 rules"));
}

#[test]
fn test_suite_json_without_target() {
    let output = expectations()
        .args(["suite", "raw", "--no-target", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let suite: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(suite["name"], "raw_housing_data");
    assert_eq!(suite["rules"].as_array().unwrap().len(), 21);
}
