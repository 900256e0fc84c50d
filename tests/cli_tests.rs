// Command-line tests for the salary_forecast binary

use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_text_report_lists_forecasts_and_failures() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("salary_forecast");
    cmd.arg(fixture("salaries.csv")).arg(fixture("survey.csv"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Salary forecasts"))
        .stdout(predicate::str::contains("Data Scientist"))
        .stdout(predicate::str::contains("Roles without a forecast"))
        .stdout(predicate::str::contains("Data Analyst: 1 distinct year"))
        .stdout(predicate::str::contains("Top skills"));
}

#[test]
fn test_strict_mode_fails_on_missing_forecast() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("salary_forecast");
    cmd.arg("--strict")
        .arg(fixture("salaries.csv"))
        .arg(fixture("survey.csv"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no forecast for: Data Analyst"));
}

#[test]
fn test_missing_input_file_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("salary_forecast");
    cmd.arg("/no/such/salaries.csv").arg(fixture("survey.csv"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("loading salary data"));
}

#[test]
fn test_json_output_is_valid() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("salary_forecast");
    cmd.arg("--format")
        .arg("json")
        .arg(fixture("salaries.csv"))
        .arg(fixture("survey.csv"));

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let forecasts = json["forecasts"].as_array().unwrap();
    assert_eq!(forecasts.len(), 3);
    assert_eq!(forecasts[0]["status"], "fitted");
    assert_eq!(forecasts[2]["status"], "failed");
    assert_eq!(forecasts[2]["role"], "Data Analyst");
}

#[test]
fn test_output_dir_receives_tables() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("salary_forecast");
    cmd.arg("--output-dir")
        .arg(dir.path())
        .arg(fixture("salaries.csv"))
        .arg(fixture("survey.csv"));

    cmd.assert().success();

    for name in [
        "report.json",
        "forecasts.csv",
        "model_fit.csv",
        "top_skills.csv",
        "salary_by_year.csv",
    ] {
        assert!(dir.path().join(name).is_file(), "missing {name}");
    }
    let skills = fs::read_to_string(dir.path().join("top_skills.csv")).unwrap();
    assert!(skills.starts_with("role,rank,skill,count"));
}

#[test]
fn test_custom_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("report.toml");
    fs::write(
        &config,
        r#"
skills = ["python"]

[roles]
"Student" = "Data Analyst"

[forecast]
years = [2030]
"#,
    )
    .unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("salary_forecast");
    cmd.arg("--config")
        .arg(&config)
        .arg(fixture("salaries.csv"))
        .arg(fixture("survey.csv"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2030"))
        .stdout(predicate::str::contains("1. python (1)"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "skills = []\n[roles]\n\"DS\" = \"Data Scientist\"\n[forecast]\nmin_points = 1\n")
        .unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("salary_forecast");
    cmd.arg("--config")
        .arg(&config)
        .arg(fixture("salaries.csv"))
        .arg(fixture("survey.csv"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("min_points"));
}
