//! Integration tests for the `copapatch` binary.
//!
//! Config loading is exercised through `copapatch-core` directly; the command
//! surface is exercised by running the built binary with real TOML files.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn copapatch(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_copapatch"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("should run copapatch binary")
}

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("copapatch.toml");
    fs::write(&path, body).expect("should write config");
    path
}

#[tokio::test]
async fn test_config_load_full_file() {
    // Given: A config file with every section
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = write_config(
        &temp_dir,
        r#"
[general]
log_level = "debug"
log_format = "json"

[scanner]
binary = "/usr/local/bin/trivy"
vuln_types = ["os", "library"]
ignore_unfixed = false

[patcher]
binary = "/usr/local/bin/copa"
patched_suffix = "-fixed"

[registry]
insecure_registries = ["localhost:5000"]
default_platform = "linux/arm64"

[engine]
verify_outputs = false
temp_root = "/var/tmp"
"#,
    );

    // When: Loading the config
    let config = copapatch_core::config::CopapatchConfig::load(&config_path)
        .await
        .expect("full config should load");

    // Then: Every section is populated
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.scanner.vuln_types, vec!["os", "library"]);
    assert!(!config.scanner.ignore_unfixed);
    assert_eq!(config.patcher.patched_suffix, "-fixed");
    assert_eq!(config.registry.insecure_registries, vec!["localhost:5000"]);
    assert!(!config.engine.verify_outputs);
}

#[tokio::test]
async fn test_config_load_malformed_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = write_config(&temp_dir, "[general\nlog_level = \"info\"\n");

    let result = copapatch_core::config::CopapatchConfig::load(&config_path).await;
    assert!(result.is_err(), "malformed TOML should fail to load");
}

#[tokio::test]
async fn test_config_load_or_default_missing_file() {
    let result =
        copapatch_core::config::CopapatchConfig::load_or_default("/nonexistent/copapatch.toml")
            .await;
    let config = result.expect("missing file should fall back to defaults");
    assert_eq!(config.patcher.binary, "copa");
}

#[test]
fn test_binary_config_validate_valid_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = write_config(&temp_dir, "[general]\nlog_level = \"warn\"\n");

    let output = copapatch(&config_path, &["config", "validate"]);

    assert!(output.status.success(), "valid config should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("VALID"));
}

#[test]
fn test_binary_config_validate_invalid_value_exits_2() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = write_config(&temp_dir, "[patcher]\npatched_suffix = \"a:b\"\n");

    let output = copapatch(&config_path, &["--output", "json", "config", "validate"]);

    assert_eq!(output.status.code(), Some(2), "invalid config should exit 2");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"valid\": false"));
    assert!(stdout.contains("patched_suffix"));
}

#[test]
fn test_binary_config_show_section_json() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = write_config(&temp_dir, "[scanner]\nbinary = \"trivy\"\n");

    let output = copapatch(
        &config_path,
        &["--output", "json", "config", "show", "--section", "scanner"],
    );

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be a JSON document");
    assert_eq!(parsed["section"], "scanner");
}

#[test]
fn test_binary_empty_image_is_invalid_input() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    // 존재하지 않는 소켓: 검증 단계에서 거부되므로 데몬에 접근하지 않음
    let socket = temp_dir.path().join("docker.sock");
    let config_path = write_config(
        &temp_dir,
        &format!(
            "[registry]\ndocker_socket = \"{}\"\n\n[patcher]\nbinary = \"/nonexistent/copa\"\n",
            socket.display()
        ),
    );

    let output = copapatch(&config_path, &["--output", "json", "patch-comprehensive", " "]);

    assert_eq!(output.status.code(), Some(3), "empty image should exit 3");
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be a JSON document");
    assert!(
        parsed["error"]
            .as_str()
            .is_some_and(|e| e.contains("image parameter is required"))
    );
}

fn unreachable_daemon_config(dir: &TempDir) -> std::path::PathBuf {
    // 존재하지 않는 소켓: 입력 검증이 데몬 연결보다 먼저 실패해야 함
    let socket = dir.path().join("missing-docker.sock");
    write_config(
        dir,
        &format!("[registry]\ndocker_socket = \"{}\"\n", socket.display()),
    )
}

#[test]
fn test_binary_empty_image_reported_before_daemon_connection() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = unreachable_daemon_config(&temp_dir);

    let output = copapatch(&config_path, &["--output", "json", "patch", ""]);

    assert_eq!(output.status.code(), Some(3), "empty image should exit 3");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("image parameter is required"));
    assert!(!stdout.contains("docker"), "daemon must not be contacted");
}

#[test]
fn test_binary_malformed_reference_reported_before_daemon_connection() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = unreachable_daemon_config(&temp_dir);

    let output = copapatch(&config_path, &["--output", "json", "patch", "Bad Ref"]);

    assert_eq!(output.status.code(), Some(3), "malformed reference should exit 3");
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be a JSON document");
    assert!(
        parsed["error"]
            .as_str()
            .is_some_and(|e| e.contains("invalid image reference 'Bad Ref'"))
    );
}

#[test]
fn test_binary_explicit_missing_config_exits_2() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("typo.toml");

    let output = copapatch(&config_path, &["--output", "json", "config", "show"]);

    assert_eq!(output.status.code(), Some(2), "missing --config file should exit 2");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("config file not found"));
    assert!(!stdout.contains("\"source\""), "defaults must not be shown");
}

#[test]
fn test_binary_explicit_missing_config_blocks_patch() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("typo.toml");

    let output = copapatch(&config_path, &["--output", "json", "patch", "alpine:3.17"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_binary_default_config_path_may_be_absent() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    // --config 없이 실행: 작업 디렉토리에 copapatch.toml 이 없으면 기본값 사용
    let output = Command::new(env!("CARGO_BIN_EXE_copapatch"))
        .current_dir(temp_dir.path())
        .args(["--output", "json", "config", "show", "--section", "patcher"])
        .env_remove("RUST_LOG")
        .output()
        .expect("should run copapatch binary");

    assert!(output.status.success(), "absent default config should fall back");
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be a JSON document");
    assert_eq!(parsed["source"], "copapatch.toml");
}

#[test]
fn test_binary_rejects_malformed_platform() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("missing.toml");

    let output = copapatch(
        &config_path,
        &["patch-platforms", "alpine:3.17", "--platform", "linux//arm"],
    );

    assert!(!output.status.success(), "malformed platform should be rejected");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid platform"));
}
