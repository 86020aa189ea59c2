//! End-to-end tests for the `tabula` binary against a SQLite file.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tabula(database_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("tabula").unwrap();
    cmd.env_remove("SESSION_TABLE")
        .env("DATABASE_URL", database_url)
        .arg("--no-color");
    cmd
}

fn sqlite_url(dir: &TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("sessions.db").display())
}

#[test]
fn test_codecs_lists_every_kind() {
    tabula("sqlite::memory:")
        .args(["sessions", "codecs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("native_binary"))
        .stdout(predicate::str::contains("migrating"))
        .stdout(predicate::str::contains("passthrough"));
}

#[test]
fn test_missing_database_url_fails() {
    Command::cargo_bin("tabula")
        .unwrap()
        .env_remove("DATABASE_URL")
        .args(["--no-color", "sessions", "count"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("DATABASE_URL"));
}

#[test]
fn test_table_lifecycle() {
    let dir = TempDir::new().unwrap();
    let url = sqlite_url(&dir);

    tabula(&url)
        .args(["sessions", "create-table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created table sessions"));

    tabula(&url)
        .args(["sessions", "count"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("0"));

    tabula(&url)
        .args(["sessions", "show", "4f1c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No session 4f1c"));

    tabula(&url)
        .args(["sessions", "clear", "--force"])
        .assert()
        .success();

    tabula(&url)
        .args(["sessions", "drop-table"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--force"));

    tabula(&url)
        .args(["sessions", "drop-table", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dropped table sessions"));

    tabula(&url).args(["sessions", "count"]).assert().code(1);
}

#[test]
fn test_custom_table_name() {
    let dir = TempDir::new().unwrap();
    let url = sqlite_url(&dir);

    tabula(&url)
        .args(["--table", "web_sessions", "sessions", "create-table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("web_sessions"));

    tabula(&url)
        .args(["--table", "web_sessions", "sessions", "count"])
        .assert()
        .success();

    // Default table was never created
    tabula(&url).args(["sessions", "count"]).assert().code(1);
}
