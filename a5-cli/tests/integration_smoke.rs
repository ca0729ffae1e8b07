//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_top_level_help_lists_commands() {
    let mut cmd = Command::cargo_bin("a5").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("reindex"))
        .stdout(predicate::str::contains("config"));
}

// === Serve Command Tests ===

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("a5").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--bind"))
        .stdout(predicate::str::contains("--user-header"))
        .stdout(predicate::str::contains("--database-url"))
        .stdout(predicate::str::contains("--index-dir"));
}

#[test]
fn test_serve_rejects_bad_bind_address() {
    let mut cmd = Command::cargo_bin("a5").unwrap();
    cmd.arg("serve").arg("--bind").arg("not-an-address");

    cmd.assert().failure();
}

#[test]
fn test_serve_without_database_url_fails() {
    let home = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("a5").unwrap();
    cmd.env_remove("DATABASE_URL")
        .env_remove("A5_CONFIG")
        .env("HOME", home.path())
        .current_dir(home.path())
        .arg("serve");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL not set"));
}

// === Reindex Command Tests ===

#[test]
fn test_reindex_help() {
    let mut cmd = Command::cargo_bin("a5").unwrap();
    cmd.arg("reindex").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--database-url"));
}

// === Config Command Tests ===

#[test]
fn test_config_path() {
    let home = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("a5").unwrap();
    cmd.env("HOME", home.path()).arg("config").arg("path");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(".a5"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server]\nbind = \"0.0.0.0:9000\"\n").unwrap();

    let mut cmd = Command::cargo_bin("a5").unwrap();
    cmd.arg("config").arg("show").arg("--config").arg(&path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0.0.0.0:9000"));
}

#[test]
fn test_config_show_rejects_invalid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server\n").unwrap();

    let mut cmd = Command::cargo_bin("a5").unwrap();
    cmd.arg("config").arg("show").arg("--config").arg(&path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid TOML"));
}
