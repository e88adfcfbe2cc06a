//! 패치 엔진 설정
//!
//! [`EngineConfig`]는 core의 `[scanner]`, `[patcher]`, `[engine]` 섹션을 합쳐
//! 오케스트레이터가 사용하는 하나의 설정으로 만듭니다.
//!
//! # 사용 예시
//!
//! ```
//! use copapatch_engine::EngineConfigBuilder;
//!
//! let config = EngineConfigBuilder::new()
//!     .patcher_binary("/usr/local/bin/copa")
//!     .verify_outputs(false)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.patched_suffix, "-patched");
//! ```

use std::path::PathBuf;

use copapatch_core::config::CopapatchConfig;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// 스캐너가 허용하는 취약점 유형
const VALID_VULN_TYPES: [&str; 2] = ["os", "library"];

/// 패치 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 스캐너 실행 파일
    pub scanner_binary: String,
    /// 스캔 대상 취약점 유형
    pub vuln_types: Vec<String>,
    /// 수정 버전이 없는 취약점 제외
    pub ignore_unfixed: bool,
    /// 패처 실행 파일
    pub patcher_binary: String,
    /// 기본 결과 태그 접미사
    pub patched_suffix: String,
    /// push 하지 않은 결과 이미지를 로컬에서 확인할지 여부
    pub verify_outputs: bool,
    /// 작업 디렉토리 상위 경로 (`None` 이면 시스템 임시 디렉토리)
    pub temp_root: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_core(&CopapatchConfig::default())
    }
}

impl EngineConfig {
    /// core 설정에서 엔진 설정을 생성합니다.
    pub fn from_core(core: &CopapatchConfig) -> Self {
        let temp_root = core.engine.temp_root.trim();
        Self {
            scanner_binary: core.scanner.binary.clone(),
            vuln_types: core.scanner.vuln_types.clone(),
            ignore_unfixed: core.scanner.ignore_unfixed,
            patcher_binary: core.patcher.binary.clone(),
            patched_suffix: core.patcher.patched_suffix.clone(),
            verify_outputs: core.engine.verify_outputs,
            temp_root: (!temp_root.is_empty()).then(|| PathBuf::from(temp_root)),
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.scanner_binary.trim().is_empty() {
            return Err(config_err("scanner_binary", "must not be empty"));
        }
        if self.patcher_binary.trim().is_empty() {
            return Err(config_err("patcher_binary", "must not be empty"));
        }
        if self.vuln_types.is_empty() {
            return Err(config_err("vuln_types", "must not be empty"));
        }
        if let Some(bad) = self
            .vuln_types
            .iter()
            .find(|t| !VALID_VULN_TYPES.contains(&t.as_str()))
        {
            return Err(config_err(
                "vuln_types",
                format!("unknown type '{bad}'"),
            ));
        }
        if self.patched_suffix.is_empty() || self.patched_suffix.contains([':', '/', '@']) {
            return Err(config_err(
                "patched_suffix",
                "must be non-empty and must not contain ':', '/' or '@'",
            ));
        }
        Ok(())
    }
}

fn config_err(field: &str, reason: impl Into<String>) -> EngineError {
    EngineError::Config {
        field: field.to_owned(),
        reason: reason.into(),
    }
}

/// [`EngineConfig`] 빌더
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scanner_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.scanner_binary = binary.into();
        self
    }

    pub fn vuln_types(mut self, types: Vec<String>) -> Self {
        self.config.vuln_types = types;
        self
    }

    pub fn ignore_unfixed(mut self, ignore: bool) -> Self {
        self.config.ignore_unfixed = ignore;
        self
    }

    pub fn patcher_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.patcher_binary = binary.into();
        self
    }

    pub fn patched_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.patched_suffix = suffix.into();
        self
    }

    pub fn verify_outputs(mut self, verify: bool) -> Self {
        self.config.verify_outputs = verify;
        self
    }

    /// 작업 디렉토리 상위 경로를 설정합니다.
    pub fn temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.temp_root = Some(root.into());
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `EngineError::Config` 반환
    pub fn build(self) -> Result<EngineConfig, EngineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
