use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hearth_core_cli").expect("binary builds");
    cmd.env("HEARTH_CORE_HOME", home.path());
    cmd
}

#[test]
fn materialize_over_empty_storage_reports_zero_budgets() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["materialize", "--date", "2024-03-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"budgets_processed\": 0"));
}

#[test]
fn sweep_accepts_an_explicit_date() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["sweep", "--date", "2024-03-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cleared_expenses"));
}

#[test]
fn scheduled_requires_a_budget() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["scheduled", "--year", "2024", "--month", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no default budget"));
}

#[test]
fn unknown_subcommand_fails() {
    let home = TempDir::new().unwrap();
    cli(&home).arg("frobnicate").assert().failure();
}
