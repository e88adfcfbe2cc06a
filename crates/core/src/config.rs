//! 설정 관리 — copapatch.toml 파싱 및 런타임 설정
//!
//! [`CopapatchConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`COPAPATCH_SCANNER_BINARY=/usr/local/bin/trivy` 형식)
//! 3. 설정 파일 (`copapatch.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), copapatch_core::error::CopapatchError> {
//! use copapatch_core::config::CopapatchConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = CopapatchConfig::load("copapatch.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = CopapatchConfig::parse("[patcher]\nbinary = \"/opt/copa\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, CopapatchError};
use crate::platform::Platform;

/// copapatch 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CopapatchConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 취약점 스캐너 (trivy) 설정
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// 패처 (copa) 설정
    #[serde(default)]
    pub patcher: PatcherConfig,
    /// 로컬 데몬 / 레지스트리 설정
    #[serde(default)]
    pub registry: RegistryConfig,
    /// 오케스트레이터 설정
    #[serde(default)]
    pub engine: EngineSection,
}

impl CopapatchConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CopapatchError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값에 환경변수 오버라이드만 적용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, CopapatchError> {
        let mut config = match Self::from_file(path).await {
            Ok(config) => config,
            Err(CopapatchError::Config(ConfigError::FileNotFound { .. })) => Self::default(),
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, CopapatchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CopapatchError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CopapatchError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, CopapatchError> {
        toml::from_str(toml_str).map_err(|e| {
            CopapatchError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `COPAPATCH_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "COPAPATCH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "COPAPATCH_GENERAL_LOG_FORMAT");

        // Scanner
        override_string(&mut self.scanner.binary, "COPAPATCH_SCANNER_BINARY");
        override_csv(&mut self.scanner.vuln_types, "COPAPATCH_SCANNER_VULN_TYPES");
        override_bool(
            &mut self.scanner.ignore_unfixed,
            "COPAPATCH_SCANNER_IGNORE_UNFIXED",
        );

        // Patcher
        override_string(&mut self.patcher.binary, "COPAPATCH_PATCHER_BINARY");
        override_string(
            &mut self.patcher.patched_suffix,
            "COPAPATCH_PATCHER_PATCHED_SUFFIX",
        );

        // Registry
        override_string(
            &mut self.registry.docker_socket,
            "COPAPATCH_REGISTRY_DOCKER_SOCKET",
        );
        override_csv(
            &mut self.registry.insecure_registries,
            "COPAPATCH_REGISTRY_INSECURE_REGISTRIES",
        );
        override_string(
            &mut self.registry.default_platform,
            "COPAPATCH_REGISTRY_DEFAULT_PLATFORM",
        );

        // Engine
        override_bool(
            &mut self.engine.verify_outputs,
            "COPAPATCH_ENGINE_VERIFY_OUTPUTS",
        );
        override_string(&mut self.engine.temp_root, "COPAPATCH_ENGINE_TEMP_ROOT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), CopapatchError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.scanner.binary.trim().is_empty() {
            return Err(invalid("scanner.binary", "must not be empty"));
        }

        let valid_vuln_types = ["os", "library"];
        if self.scanner.vuln_types.is_empty() {
            return Err(invalid("scanner.vuln_types", "must not be empty"));
        }
        if let Some(bad) = self
            .scanner
            .vuln_types
            .iter()
            .find(|t| !valid_vuln_types.contains(&t.as_str()))
        {
            return Err(invalid(
                "scanner.vuln_types",
                format!(
                    "unknown type '{bad}', must be one of: {}",
                    valid_vuln_types.join(", ")
                ),
            ));
        }

        if self.patcher.binary.trim().is_empty() {
            return Err(invalid("patcher.binary", "must not be empty"));
        }

        // 접미사는 태그 일부가 되므로 태그 문법을 벗어나면 안 됨
        let suffix_ok = self
            .patcher
            .patched_suffix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
        if self.patcher.patched_suffix.is_empty() || !suffix_ok {
            return Err(invalid(
                "patcher.patched_suffix",
                "must be non-empty and contain only [A-Za-z0-9_.-]",
            ));
        }

        if let Err(e) = self.registry.default_platform() {
            return Err(invalid("registry.default_platform", e.to_string()));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> CopapatchError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 취약점 스캐너 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// 스캐너 실행 파일
    pub binary: String,
    /// 스캔 대상 취약점 유형 (os, library)
    pub vuln_types: Vec<String>,
    /// 수정 버전이 없는 취약점 제외
    pub ignore_unfixed: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            binary: "trivy".to_owned(),
            vuln_types: vec!["os".to_owned()],
            ignore_unfixed: true,
        }
    }
}

/// 패처 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatcherConfig {
    /// 패처 실행 파일
    pub binary: String,
    /// 태그를 지정하지 않았을 때 원래 태그 뒤에 붙는 접미사
    pub patched_suffix: String,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            binary: "copa".to_owned(),
            patched_suffix: "-patched".to_owned(),
        }
    }
}

/// 로컬 데몬 / 레지스트리 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Docker 소켓 경로 (비어 있으면 로컬 기본값)
    pub docker_socket: String,
    /// HTTP 로 접근하는 레지스트리 목록
    pub insecure_registries: Vec<String>,
    /// 레지스트리가 플랫폼을 알려주지 않을 때 사용할 플랫폼 (비어 있으면 호스트)
    pub default_platform: String,
}

impl RegistryConfig {
    /// 설정된 기본 플랫폼, 없으면 호스트 플랫폼
    pub fn default_platform(&self) -> Result<Platform, CopapatchError> {
        if self.default_platform.trim().is_empty() {
            Ok(Platform::host())
        } else {
            Ok(self.default_platform.parse()?)
        }
    }
}

/// 오케스트레이터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// 패치 후 예상 결과 이미지가 로컬에 존재하는지 확인 (push 하지 않는 경우)
    pub verify_outputs: bool,
    /// 요청별 임시 디렉토리의 상위 경로 (비어 있으면 시스템 임시 디렉토리)
    pub temp_root: String,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            verify_outputs: true,
            temp_root: String::new(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
