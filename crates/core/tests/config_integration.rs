//! copapatch.toml 통합 설정 테스트
//!
//! - copapatch.toml.example 파싱 테스트
//! - 부분 설정 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 잘못된 형식 에러 테스트

use copapatch_core::config::CopapatchConfig;
use copapatch_core::error::{ConfigError, CopapatchError};
use serial_test::serial;

// =============================================================================
// copapatch.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../copapatch.toml.example");
    let config = CopapatchConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "pretty");
    assert_eq!(config.scanner.binary, "trivy");
    assert_eq!(config.patcher.binary, "copa");
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../copapatch.toml.example");
    let config = CopapatchConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_defaults() {
    let content = include_str!("../../../copapatch.toml.example");
    let config = CopapatchConfig::parse(content).expect("should parse");
    let defaults = CopapatchConfig::default();

    assert_eq!(config.scanner.vuln_types, defaults.scanner.vuln_types);
    assert_eq!(config.scanner.ignore_unfixed, defaults.scanner.ignore_unfixed);
    assert_eq!(config.patcher.patched_suffix, defaults.patcher.patched_suffix);
    assert_eq!(config.engine.verify_outputs, defaults.engine.verify_outputs);
}

// =============================================================================
// 파일 로딩
// =============================================================================

#[tokio::test]
#[serial]
async fn load_reads_file_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("copapatch.toml");
    std::fs::write(
        &path,
        "[scanner]\nvuln_types = [\"os\", \"library\"]\n\n[engine]\nverify_outputs = false\n",
    )
    .unwrap();

    let config = CopapatchConfig::load(&path).await.unwrap();
    assert_eq!(config.scanner.vuln_types, vec!["os", "library"]);
    assert!(!config.engine.verify_outputs);
}

#[tokio::test]
#[serial]
async fn load_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("copapatch.toml");
    std::fs::write(&path, "[general]\nlog_format = \"xml\"\n").unwrap();

    let err = CopapatchConfig::load(&path).await.unwrap_err();
    assert!(matches!(
        err,
        CopapatchError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[tokio::test]
#[serial]
async fn env_overrides_take_precedence_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("copapatch.toml");
    std::fs::write(&path, "[patcher]\nbinary = \"/from/file/copa\"\n").unwrap();

    // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
    unsafe { std::env::set_var("COPAPATCH_PATCHER_BINARY", "/from/env/copa") };
    let result = CopapatchConfig::load(&path).await;
    unsafe { std::env::remove_var("COPAPATCH_PATCHER_BINARY") };

    assert_eq!(result.unwrap().patcher.binary, "/from/env/copa");
}

#[tokio::test]
async fn load_or_default_still_reports_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("copapatch.toml");
    std::fs::write(&path, "not = [valid").unwrap();

    let err = CopapatchConfig::load_or_default(&path).await.unwrap_err();
    assert!(matches!(
        err,
        CopapatchError::Config(ConfigError::ParseFailed { .. })
    ));
}
