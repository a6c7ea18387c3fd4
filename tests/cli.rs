use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Run the binary in `dir` with credentials pinned empty. dotenvy never
/// overrides variables that are already set, so a `.env` file cannot put a
/// real token back.
fn turon_in(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("turon-proxy").unwrap();
    cmd.current_dir(dir)
        .env("REPLICATE_API_TOKEN", "")
        .env("REPLICATE_MODEL_VERSION", "")
        .env("REPLICATE_MODEL", "")
        .env_remove("REPLICATE_API_BASE")
        .env_remove("REPLICATE_AUTH_HEADER")
        .env_remove("REPLICATE_AUTH_SCHEME")
        .env_remove("TURON_FACTS");
    cmd
}

fn turon() -> (Command, TempDir) {
    let dir = TempDir::new().unwrap();
    (turon_in(dir.path()), dir)
}

#[test]
fn test_cli_help() {
    let (mut cmd, _dir) = turon();
    cmd
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: turon-proxy <COMMAND>"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("facts"))
        .stdout(predicate::str::contains("--version"));
}

#[test]
fn test_cli_serve_help() {
    let (mut cmd, _dir) = turon();
    cmd
        .arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: turon-proxy serve"))
        .stdout(predicate::str::contains("--port <PORT>"))
        .stdout(predicate::str::contains("--api-token <API_TOKEN>"))
        .stdout(predicate::str::contains("--max-poll-attempts <MAX_POLL_ATTEMPTS>"));
}

#[test]
fn test_cli_no_command() {
    let (mut cmd, _dir) = turon();
    cmd
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: turon-proxy <COMMAND>"));
}

#[test]
fn test_ask_quick_answer_offline() {
    let (mut cmd, _dir) = turon();
    cmd
        .arg("ask")
        .arg("ish vaqti qachon?")
        .assert()
        .success()
        .stdout(predicate::str::contains("09:00 - 18:00"))
        .stdout(predicate::str::contains("\"source\": \"local\""));
}

#[test]
fn test_ask_reads_stdin() {
    let (mut cmd, _dir) = turon();
    cmd
        .arg("ask")
        .write_stdin("Markaz manzili qaerda?\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Marhamat shahri"));
}

#[test]
fn test_ask_without_token_fails_with_config_error() {
    let (mut cmd, _dir) = turon();
    cmd
        .arg("ask")
        .arg("Matematika o'qituvchisi kim?")
        .arg("--api-base")
        .arg("http://127.0.0.1:9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"kind\":\"config\""));
}

#[test]
fn test_dotenv_file_cannot_supply_pinned_token() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "REPLICATE_API_TOKEN=r8_dev_token\nREPLICATE_MODEL_VERSION=v1\n",
    )
    .unwrap();

    turon_in(dir.path())
        .arg("ask")
        .arg("Matematika o'qituvchisi kim?")
        .arg("--api-base")
        .arg("http://127.0.0.1:9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"kind\":\"config\""));
}

#[test]
fn test_facts_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("facts.json");
    std::fs::write(
        &path,
        r#"{"name":"Test Markaz","address":"Toshkent","phone":"+998 00","hours":"10-17","courses":["Fizika"]}"#,
    )
    .unwrap();

    let (mut cmd, _dir) = turon();
    cmd
        .arg("facts")
        .arg("--facts")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Test Markaz"))
        .stdout(predicate::str::contains("Toshkent"));
}

#[test]
fn test_facts_default() {
    let (mut cmd, _dir) = turon();
    cmd
        .arg("facts")
        .assert()
        .success()
        .stdout(predicate::str::contains("Turon O'quv Markazi"));
}
