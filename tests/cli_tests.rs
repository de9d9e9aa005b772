//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;

fn selgrab_bin() -> Command {
    let mut cmd = Command::cargo_bin("selgrab").expect("binary is built");
    cmd.env_remove("SELGRAB_TIMEOUT")
        .env_remove("SELGRAB_LOG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_output() {
    selgrab_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("selection"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("--keystroke-tool"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("paste"));
}

#[test]
fn version_output() {
    selgrab_bin()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("selgrab"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_path_command() {
    selgrab_bin()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("selgrab"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_help() {
    selgrab_bin()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("list"));
}

#[test]
#[cfg(target_os = "linux")]
fn config_set_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();

    selgrab_bin()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "set", "timeout", "750ms"])
        .assert()
        .success();

    selgrab_bin()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "get", "timeout"])
        .assert()
        .success()
        .stdout(predicate::str::diff("750ms\n"));

    assert!(dir.path().join("selgrab").join("config.toml").exists());
}

#[test]
#[cfg(target_os = "linux")]
fn config_list_shows_every_key() {
    let dir = tempfile::tempdir().unwrap();

    selgrab_bin()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success();

    selgrab_bin()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_format_size"))
        .stdout(predicate::str::contains("5MB"))
        .stdout(predicate::str::contains("open_retries"));
}

#[test]
#[cfg(not(windows))]
fn get_is_unsupported_without_win32_clipboard() {
    let dir = tempfile::tempdir().unwrap();

    selgrab_bin()
        .env("XDG_CONFIG_HOME", dir.path())
        .arg("get")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not supported"));
}
