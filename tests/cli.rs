//! Runs the `examplepackage` binary the way a user would.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn examplepackage() -> Command {
    Command::cargo_bin("examplepackage").unwrap()
}

#[test]
fn test_direct_run_prints_last_result() {
    examplepackage()
        .assert()
        .success()
        .stdout(predicate::str::contains("fast computation result: 2"))
        .stdout(predicate::str::contains("slow computation result: 42"))
        .stdout(predicate::str::contains("All tests passed!"))
        .stdout(predicate::str::contains("The last result of the last test was\n 42"));
}

#[test]
fn test_quiet_run_hides_diagnostics() {
    examplepackage()
        .args(["--quiet", "--filter", "fast"])
        .assert()
        .success()
        .stdout(predicate::str::contains("test_fast_compute ... "))
        .stdout(predicate::str::contains("computation result").not())
        .stdout(predicate::str::contains("test_slow_compute").not());
}

#[test]
fn test_excluding_long_tag_runs_nothing() {
    examplepackage()
        .args(["--exclude-tag", "long"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No test recorded a result"));
}

#[test]
fn test_json_reporter_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("autotest.toml");
    fs::write(&config_path, "reporter = \"json\"\n\n[runner]\nfilter = \"fast\"\n").unwrap();

    let output = examplepackage()
        .arg("--config")
        .arg(&config_path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["stats"]["passed"], 1);
    assert_eq!(report["results"][0]["name"], "test_fast_compute");
    assert_eq!(report["results"][0]["locals"]["result_short"], 2);
}

#[test]
fn test_command_line_selection_overrides_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("autotest.toml");
    fs::write(
        &config_path,
        "[runner]\ninclude_tags = [\"smoke\"]\nexclude_tags = [\"long\"]\nfilter = \"fast\"\n",
    ).unwrap();

    // the file alone selects nothing
    examplepackage()
        .arg("--config")
        .arg(&config_path)
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("test_fast_compute").not());

    examplepackage()
        .arg("--config")
        .arg(&config_path)
        .args(["--tag", "long", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("test_fast_compute ... "))
        .stdout(predicate::str::contains("test_slow_compute").not());
}

#[test]
fn test_bad_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    examplepackage()
        .arg("--config")
        .arg(temp_dir.path().join("missing.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}
