//! Error scenario integration tests

use std::process::Command;

fn selgrab_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_selgrab"));
    cmd.env_remove("SELGRAB_TIMEOUT")
        .env_remove("SELGRAB_LOG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn invalid_timeout_is_usage_error() {
    let output = selgrab_bin()
        .args(["--timeout", "whenever"])
        .env("XDG_CONFIG_HOME", "/nonexistent")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("timeout"),
        "Expected error naming the timeout key, got: {}",
        stderr
    );
}

#[test]
fn invalid_timeout_from_env_is_usage_error() {
    let output = selgrab_bin()
        .env("SELGRAB_TIMEOUT", "2 parsecs")
        .env("XDG_CONFIG_HOME", "/nonexistent")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unknown_keystroke_tool_is_usage_error() {
    let output = selgrab_bin()
        .args(["--keystroke-tool", "xdotool", "get"])
        .env("XDG_CONFIG_HOME", "/nonexistent")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("enigo, none"), "got: {}", stderr);
}

#[test]
fn config_get_unknown_key() {
    let output = selgrab_bin()
        .args(["config", "get", "unknown_key"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown key"));
}

#[test]
fn config_set_invalid_size() {
    let dir = tempfile::tempdir().unwrap();
    let output = selgrab_bin()
        .args(["config", "set", "max_format_size", "huge"])
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max_format_size"), "got: {}", stderr);
}

#[test]
fn set_without_text_is_usage_error() {
    let output = selgrab_bin()
        .arg("set")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}
