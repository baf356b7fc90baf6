#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

fn petnamer(home: &std::path::Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin("petnamer"));
    cmd.env("PETNAMER_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("OPENAI_API_KEY");
    cmd
}

#[test]
fn test_default_logging_is_human_readable() {
    let temp = tempfile::TempDir::new().unwrap();

    petnamer(temp.path())
        .args(["generate", "--animal", "cat"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("API key not configured"))
        .stdout(predicate::str::contains("\"level\":").not());
}

#[test]
fn test_json_logging_flag_emits_json() {
    let temp = tempfile::TempDir::new().unwrap();

    petnamer(temp.path())
        .args(["--log-json", "generate", "--animal", "cat"])
        .arg("--config")
        .arg("/nonexistent/petnamer.yaml")
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"level\":"))
        .stdout(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_verbose_logging_adds_levels() {
    let temp = tempfile::TempDir::new().unwrap();

    petnamer(temp.path())
        .args(["-v", "generate", "--animal", "cat"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(" WARN "))
        .stdout(predicate::str::contains("no API key found"));
}

#[test]
fn test_run_log_file_is_written() {
    let temp = tempfile::TempDir::new().unwrap();

    petnamer(temp.path())
        .args(["generate", "--animal", "cat"])
        .assert()
        .failure();

    let logs_dir = temp.path().join(".petnamer").join("logs");
    let entries: Vec<_> = std::fs::read_dir(&logs_dir)
        .expect("logs dir exists")
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "log"))
        .collect();
    assert_eq!(entries.len(), 1, "expected one run log in {logs_dir:?}");

    let contents = std::fs::read_to_string(entries[0].path()).unwrap();
    assert!(contents.contains("\"level\":\"ERROR\""), "log: {contents}");
}
