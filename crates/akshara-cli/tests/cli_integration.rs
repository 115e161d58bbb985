//! CLI subprocess integration tests.
//!
//! These tests invoke the `akshara` binary as a subprocess against the mock
//! backend and an in-process stub of the transliteration API, and verify
//! exit codes, stdout content, and JSON output stability.

use akshara_server::{Stub, TestServer};
use std::process::{Command, Output};
use std::time::Duration;

struct Env {
    config: tempfile::TempDir,
    data: tempfile::TempDir,
    locks: tempfile::TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            config: tempfile::tempdir().unwrap(),
            data: tempfile::tempdir().unwrap(),
            locks: tempfile::tempdir().unwrap(),
        }
    }

    fn akshara(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_akshara"));
        cmd.env("XDG_CONFIG_HOME", self.config.path())
            .env("XDG_DATA_HOME", self.data.path())
            .env("TMPDIR", self.locks.path())
            .env("AKSHARA_SKIP_PREREQS", "1")
            .env_remove("AKSHARA_PROJECT")
            .env_remove("AKSHARA_PORT")
            .env_remove("AKSHARA_BACKEND")
            .env_remove("AKSHARA_LOG")
            .args(["--backend", "mock"]);
        cmd
    }

    fn against(&self, server: &TestServer) -> Command {
        let mut cmd = self.akshara();
        cmd.args(["--host", &server.host, "--port", &server.port.to_string()]);
        cmd
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|e| panic!("invalid JSON ({e}): {}", stdout(output)))
}

/// A loopback port with nothing listening on it.
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn cli_version_exits_zero() {
    let output = Env::new().akshara().arg("--version").output().unwrap();
    assert!(output.status.success(), "akshara --version must exit 0");
    assert!(stdout(&output).contains("akshara"));
}

#[test]
fn cli_help_lists_commands() {
    let output = Env::new().akshara().arg("--help").output().unwrap();
    assert!(output.status.success());
    let out = stdout(&output);
    for cmd in ["init", "recreate", "pull", "stop", "translit", "roman", "scripts"] {
        assert!(out.contains(cmd), "help must list '{cmd}'");
    }
}

#[test]
fn cli_translit_prints_service_result() {
    let env = Env::new();
    let server = TestServer::echo();

    let output = env
        .against(&server)
        .args(["translit", "namaste", "--from", "ISO", "--to", "Devanagari"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "namaste\n");

    let queries = server.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].source.as_deref(), Some("ISO"));
    assert_eq!(queries[0].target.as_deref(), Some("Devanagari"));
    assert!(!queries[0].has_param("nativize"));
}

#[test]
fn cli_translit_forwards_options() {
    let env = Env::new();
    let server = TestServer::echo();

    let output = env
        .against(&server)
        .args([
            "translit",
            "x",
            "--to",
            "ISO",
            "--no-nativize",
            "--pre",
            "RemoveDiacritics",
            "--post",
            "A",
            "--post",
            "B",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let q = &server.queries()[0];
    assert_eq!(q.nativize.as_deref(), Some("false"));
    assert_eq!(q.preoptions.as_deref(), Some("RemoveDiacritics"));
    assert_eq!(q.postoptions.as_deref(), Some("A,B"));
    assert!(!q.has_param("source"));
}

#[test]
fn cli_translit_json_output_stable() {
    let env = Env::new();
    let server = TestServer::start(Stub::fixed("namaste"));

    let output = env
        .against(&server)
        .args(["--json", "translit", "नमस्ते", "--to", "ISO"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let value = json(&output);
    assert_eq!(value["text"], "नमस्ते");
    assert_eq!(value["to"], "ISO");
    assert!(value["from"].is_null());
    assert_eq!(value["result"], "namaste");
}

#[test]
fn cli_invalid_target_is_validation_error() {
    let env = Env::new();
    let server = TestServer::echo();

    let output = env
        .against(&server)
        .args(["translit", "x", "--to", "NotAScript"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("invalid target script"));
    assert!(server.queries().is_empty(), "validation must not reach the service");
}

#[test]
fn cli_empty_text_is_validation_error() {
    let env = Env::new();
    let server = TestServer::echo();

    let output = env
        .against(&server)
        .args(["translit", "", "--from", "Bogus", "--to", "ISO"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("empty"));
}

#[test]
fn cli_roman_resolves_language_scripts() {
    let env = Env::new();
    let server = TestServer::start(Stub::fixed("namaste"));

    let output = env
        .against(&server)
        .args(["--json", "roman", "नमस्ते", "--lang", "hi"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let value = json(&output);
    assert_eq!(value["from"], "Devanagari");
    assert_eq!(value["to"], "ISO");
    assert_eq!(value["result"], "namaste");

    let q = &server.queries()[0];
    assert_eq!(q.source.as_deref(), Some("Devanagari"));
    assert_eq!(q.target.as_deref(), Some("ISO"));
}

#[test]
fn cli_roman_unmapped_language_fails_before_service() {
    let env = Env::new();
    let server = TestServer::echo();

    let output = env
        .against(&server)
        .args(["roman", "hello", "--lang", "eng"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("no script mapping"));
    assert!(server.queries().is_empty());
}

#[test]
fn cli_backend_status_error_exits_3() {
    let env = Env::new();
    let server = TestServer::start(Stub::status(500));

    let output = env
        .against(&server)
        .args(["--json", "translit", "x", "--to", "ISO"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let value = json(&output);
    assert_eq!(value["stage"], "backend");
    assert!(value["error"].as_str().unwrap().contains("500"));
}

#[test]
fn cli_unreachable_service_is_transport_error() {
    let env = Env::new();
    let port = closed_port();

    let output = env
        .akshara()
        .args(["--host", "127.0.0.1", "--port", &port.to_string()])
        .args(["translit", "x", "--to", "ISO"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("VPN"));
}

#[test]
fn cli_timeout_bounds_slow_service() {
    let env = Env::new();
    let server = TestServer::start(Stub::echo().with_delay(Duration::from_secs(10)));

    let started = std::time::Instant::now();
    let output = env
        .against(&server)
        .args(["--timeout", "1", "translit", "x", "--to", "ISO"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("deadline exceeded"));
    assert!(started.elapsed() < Duration::from_secs(8));
}

#[test]
fn cli_init_json_reports_ready() {
    let env = Env::new();
    let output = env.akshara().args(["--json", "init"]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let value = json(&output);
    assert_eq!(value["state"], "ready");
    assert_eq!(value["backend"], "mock");
    assert_eq!(value["project"], "aksharamukha");
    assert_eq!(value["base_url"], "http://localhost:8085/api/public");
}

#[test]
fn cli_project_and_port_flags_apply() {
    let env = Env::new();
    let output = env
        .akshara()
        .args(["--json", "--project", "custom", "--port", "9999", "init", "--quiet"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let value = json(&output);
    assert_eq!(value["project"], "custom");
    assert_eq!(value["base_url"], "http://localhost:9999/api/public");
}

#[test]
fn cli_settings_file_is_read() {
    let env = Env::new();
    let dir = env.config.path().join("akshara");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        "project_name = \"from-file\"\nport = 9100\n",
    )
    .unwrap();

    let output = env.akshara().args(["--json", "init"]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value = json(&output);
    assert_eq!(value["project"], "from-file");
    assert_eq!(value["base_url"], "http://localhost:9100/api/public");
}

#[test]
fn cli_invalid_settings_file_fails() {
    let env = Env::new();
    let path = env.config.path().join("bad.toml");
    std::fs::write(&path, "no_such_setting = true\n").unwrap();

    let output = env
        .akshara()
        .args(["--config", &path.to_string_lossy(), "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("configuration error"));
}

#[test]
fn cli_status_json_for_stopped_service() {
    let env = Env::new();
    let output = env.akshara().args(["--json", "status"]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let value = json(&output);
    assert_eq!(value["running"], false);
    assert_eq!(value["ready"], false);
    assert!(value["services"].as_array().unwrap().is_empty());
}

#[test]
fn cli_stop_is_idempotent() {
    let env = Env::new();
    for _ in 0..2 {
        let output = env.akshara().arg("stop").output().unwrap();
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("stopped aksharamukha"));
    }
}

#[test]
fn cli_pull_with_mock_succeeds() {
    let env = Env::new();
    let output = env.akshara().args(["--json", "pull"]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(json(&output)["pulled"], true);
}

#[test]
fn cli_recreate_latest_with_mock_succeeds() {
    let env = Env::new();
    let output = env
        .akshara()
        .args(["--json", "recreate", "--latest"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value = json(&output);
    assert_eq!(value["state"], "ready");
    assert_eq!(value["pulled_latest"], true);
}

#[test]
fn cli_unknown_backend_fails() {
    let env = Env::new();
    let output = env
        .akshara()
        .args(["--backend", "nonexistent", "status"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("nonexistent"));
}

#[test]
fn cli_scripts_lists_catalog() {
    let output = Env::new()
        .akshara()
        .args(["--json", "scripts"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value = json(&output);
    let scripts = value.as_array().unwrap();
    assert_eq!(scripts.len(), 141);
    assert!(scripts.iter().any(|s| s == "Devanagari"));
}

#[test]
fn cli_scripts_for_language() {
    let output = Env::new()
        .akshara()
        .args(["--json", "scripts", "--lang", "ta"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value = json(&output);
    assert_eq!(value["language"], "tam");
    assert_eq!(value["scripts"][0], "Tamil");
}

#[test]
fn cli_scripts_invalid_language_exits_2() {
    let output = Env::new()
        .akshara()
        .args(["scripts", "--lang", "12"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_doctor_json_lists_checks() {
    let output = Env::new()
        .akshara()
        .args(["--json", "doctor"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value = json(&output);
    assert_eq!(value["healthy"], true);
    let names: Vec<_> = value["checks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_owned())
        .collect();
    assert!(names.contains(&"backend_prereqs".to_owned()));
    assert!(names.contains(&"project_lock".to_owned()));
}

#[test]
fn cli_completions_bash() {
    let output = Env::new()
        .akshara()
        .args(["completions", "bash"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("akshara"));
}

#[test]
fn cli_man_pages_written() {
    let dir = tempfile::tempdir().unwrap();
    let output = Env::new()
        .akshara()
        .args(["man-pages", &dir.path().to_string_lossy()])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("akshara.1").exists());
    assert!(dir.path().join("akshara-translit.1").exists());
}
