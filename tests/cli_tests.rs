//! CLI integration tests.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use insiderwatch::testkit::config::{TEST_ENCRYPTION_KEY, TEST_TELEGRAM_TOKEN};
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary run from an empty directory with a cleared environment, so
/// neither a developer `.env` nor a local `config.toml` leaks in.
fn insiderwatch(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("insiderwatch");
    cmd.current_dir(dir.path()).env_clear();
    cmd
}

fn with_secrets(mut cmd: Command) -> Command {
    cmd.env("TELEGRAM_TOKEN", TEST_TELEGRAM_TOKEN)
        .env("ENCRYPTION_KEY", TEST_ENCRYPTION_KEY);
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    insiderwatch(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("recover"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn version_names_the_binary() {
    let dir = TempDir::new().unwrap();
    insiderwatch(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("insiderwatch"));
}

#[test]
fn check_without_token_fails() {
    let dir = TempDir::new().unwrap();
    insiderwatch(&dir)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TELEGRAM_TOKEN"));
}

#[test]
fn check_with_short_key_fails() {
    let dir = TempDir::new().unwrap();
    insiderwatch(&dir)
        .arg("check")
        .env("TELEGRAM_TOKEN", TEST_TELEGRAM_TOKEN)
        .env("ENCRYPTION_KEY", "short")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ENCRYPTION_KEY"));
}

#[test]
fn check_reports_valid_configuration() {
    let dir = TempDir::new().unwrap();
    with_secrets(insiderwatch(&dir))
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("disabled"));
}

#[test]
fn check_shows_enabled_brokerage() {
    let dir = TempDir::new().unwrap();
    with_secrets(insiderwatch(&dir))
        .arg("check")
        .env("BROKER_USERNAME", "ann")
        .env("BROKER_PASSWORD", "pw")
        .assert()
        .success()
        .stdout(predicate::str::contains("enabled"))
        .stdout(predicate::str::contains("disabled").not());
}

#[test]
fn check_reads_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tunables.toml");
    fs::write(&path, "[scheduler]\ncheck_interval_minutes = 7\n").unwrap();

    with_secrets(insiderwatch(&dir))
        .arg("check")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("7 minutes"));
}

#[test]
fn check_rejects_missing_config_file() {
    let dir = TempDir::new().unwrap();
    with_secrets(insiderwatch(&dir))
        .args(["check", "--config", "nowhere.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn recover_on_fresh_database_reports_fresh_start() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("data").join("bot.db");

    with_secrets(insiderwatch(&dir))
        .arg("recover")
        .env("DATABASE_URL", format!("sqlite:///{}", db.display()))
        .env("LOG_LEVEL", "error")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recovery complete"))
        .stdout(predicate::str::contains("Fresh start"));

    assert!(db.exists(), "database file is created on first use");
}
