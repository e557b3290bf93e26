//! Integration tests for the `gvmctl` CLI binary.
//!
//! These tests cover argument parsing, help output, shell completions and
//! error exit codes, plus a few round trips against a stub gvmd socket.
#![allow(clippy::unwrap_used)]

use std::io::{Read, Write};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::thread;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `gvmctl` binary with env isolation.
///
/// Clears all `GVMCTL_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn gvmctl_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("gvmctl");
    cmd.env("HOME", "/tmp/gvmctl-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/gvmctl-cli-test-nonexistent")
        .env_remove("GVMCTL_PROFILE")
        .env_remove("GVMCTL_SOCKET")
        .env_remove("GVMCTL_USERNAME")
        .env_remove("GVMCTL_PASSWORD")
        .env_remove("GVMCTL_OUTPUT")
        .env_remove("GVMCTL_TIMEOUT")
        .env_remove("GVMCTL_BUFSIZE")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const AUTH_OK: &str = r#"<authenticate_response status="200" status_text="OK"><role>Admin</role></authenticate_response><help_response status="200"/>"#;

/// A one-connection stub gvmd answering requests with canned responses.
fn stub_gvmd(dir: &Path, responses: Vec<String>) -> PathBuf {
    let path = dir.join("gvmd.sock");
    let listener = UnixListener::bind(&path).unwrap();
    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        let mut chunk = [0_u8; 4096];
        for response in responses {
            let mut request = Vec::new();
            while !request.ends_with(b"\n") {
                match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => return,
                    Ok(n) => request.extend_from_slice(&chunk[..n]),
                }
            }
            if stream.write_all(response.as_bytes()).is_err() {
                return;
            }
        }
    });
    path
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = gvmctl_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    gvmctl_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Greenbone")
            .and(predicate::str::contains("targets"))
            .and(predicate::str::contains("tasks"))
            .and(predicate::str::contains("scan")),
    );
}

#[test]
fn test_version_flag() {
    gvmctl_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gvmctl"));
}

#[test]
fn test_invalid_output_format_is_usage_error() {
    gvmctl_cmd()
        .args(["-o", "xml", "tasks", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_invalid_timeout_is_usage_error() {
    gvmctl_cmd()
        .args(["--timeout", "soon", "version"])
        .assert()
        .code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    gvmctl_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    gvmctl_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gvmctl"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_prints_toml_path() {
    gvmctl_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_without_file_prints_defaults() {
    gvmctl_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[defaults]")
                .and(predicate::str::contains("/run/gvmd/gvmd.sock")),
        );
}

#[test]
fn test_config_use_unknown_profile_fails() {
    let output = gvmctl_cmd()
        .args(["config", "use", "lab"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("Profile 'lab' not found"), "{text}");
}

#[test]
fn test_unknown_profile_flag_fails_before_connecting() {
    let output = gvmctl_cmd()
        .args(["--profile", "lab", "tasks", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("Profile 'lab' not found"), "{text}");
}

// ── Connection errors ───────────────────────────────────────────────

#[test]
fn test_missing_socket_exits_with_connection_code() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("absent.sock");

    let output = gvmctl_cmd()
        .arg("--socket")
        .arg(&socket)
        .args(["--password", "x", "tasks", "list"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(7));
    let text = combined_output(&output);
    assert!(text.contains("Could not connect to gvmd"), "{text}");
}

// ── Stub gvmd round trips ───────────────────────────────────────────

#[test]
fn test_version_against_stub() {
    let dir = tempfile::tempdir().unwrap();
    let socket = stub_gvmd(
        dir.path(),
        vec![r#"<get_version_response status="200"><version>22.4</version></get_version_response>"#.into()],
    );

    gvmctl_cmd()
        .arg("--socket")
        .arg(&socket)
        .args(["--timeout", "500ms", "-o", "plain", "version"])
        .assert()
        .success()
        .stdout("22.4\n");
}

#[test]
fn test_targets_list_plain_prints_ids() {
    let dir = tempfile::tempdir().unwrap();
    let socket = stub_gvmd(
        dir.path(),
        vec![
            AUTH_OK.into(),
            concat!(
                r#"<authenticate_response status="200"/>"#,
                r#"<get_targets_response status="200">"#,
                r#"<target id="tgt-1"><name>lab</name><comment/><hosts>10.0.0.1</hosts><max_hosts>1</max_hosts><in_use>0</in_use></target>"#,
                r#"<target id="tgt-2"><name>dmz</name><comment/><hosts>10.0.1.0/30</hosts><max_hosts>4</max_hosts><in_use>1</in_use></target>"#,
                "</get_targets_response>"
            )
            .into(),
        ],
    );

    gvmctl_cmd()
        .arg("--socket")
        .arg(&socket)
        .args(["--password", "x", "--timeout", "500ms", "-o", "plain"])
        .args(["targets", "list"])
        .assert()
        .success()
        .stdout("tgt-1\ntgt-2\n");
}

#[test]
fn test_rejected_login_exits_with_auth_code() {
    let dir = tempfile::tempdir().unwrap();
    let socket = stub_gvmd(
        dir.path(),
        vec![r#"<authenticate_response status="400" status_text="Authentication failed"/>"#.into()],
    );

    let output = gvmctl_cmd()
        .arg("--socket")
        .arg(&socket)
        .args(["--password", "wrong", "--timeout", "500ms", "tasks", "list"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("Authentication failed"), "{text}");
}

#[test]
fn test_unknown_task_exits_with_not_found_code() {
    let dir = tempfile::tempdir().unwrap();
    let socket = stub_gvmd(
        dir.path(),
        vec![
            AUTH_OK.into(),
            r#"<authenticate_response status="200"/><get_tasks_response status="200"/>"#.into(),
        ],
    );

    gvmctl_cmd()
        .arg("--socket")
        .arg(&socket)
        .args(["--password", "x", "--timeout", "500ms", "tasks", "progress", "t-0"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("task 't-0' not found"));
}
