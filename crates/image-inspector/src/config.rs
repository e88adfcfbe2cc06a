//! 이미지 인스펙터 설정
//!
//! [`InspectorConfig`]는 core의 [`RegistryConfig`](copapatch_core::config::RegistryConfig)를
//! 기반으로 로컬 데몬 및 레지스트리 접근 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use copapatch_core::config::CopapatchConfig;
//! use copapatch_image_inspector::config::InspectorConfig;
//!
//! let core_config = CopapatchConfig::default();
//! let config = InspectorConfig::from_core(&core_config.registry);
//! ```

use copapatch_core::platform::Platform;
use serde::{Deserialize, Serialize};

use crate::error::InspectorError;

/// 이미지 인스펙터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorConfig {
    /// Docker 소켓 경로 (비어 있으면 로컬 기본값)
    pub docker_socket: String,
    /// HTTP 로 접근하는 레지스트리 (`host[:port]`)
    pub insecure_registries: Vec<String>,
    /// 레지스트리가 사용 가능한 플랫폼을 알려주지 않을 때의 기본 플랫폼
    pub default_platform: Platform,

    // --- 확장 설정 (core에 없는 추가 필드) ---
    /// Docker 소켓 요청 타임아웃 (초)
    pub docker_timeout_secs: u64,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            docker_socket: String::new(),
            insecure_registries: Vec::new(),
            default_platform: Platform::host(),
            docker_timeout_secs: 120,
        }
    }
}

/// 설정 상한값 상수
const MAX_DOCKER_TIMEOUT_SECS: u64 = 600;

impl InspectorConfig {
    /// core의 `RegistryConfig`에서 인스펙터 설정을 생성합니다.
    ///
    /// `default_platform` 은 core `validate()` 에서 이미 검증되었으므로
    /// 파싱에 실패하면 호스트 플랫폼을 사용합니다.
    pub fn from_core(core: &copapatch_core::config::RegistryConfig) -> Self {
        Self {
            docker_socket: core.docker_socket.clone(),
            insecure_registries: core.insecure_registries.clone(),
            default_platform: core.default_platform().unwrap_or_else(|_| Platform::host()),
            ..Self::default()
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), InspectorError> {
        if self.docker_timeout_secs == 0 || self.docker_timeout_secs > MAX_DOCKER_TIMEOUT_SECS {
            return Err(InspectorError::Config {
                field: "docker_timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_DOCKER_TIMEOUT_SECS}"),
            });
        }

        for registry in &self.insecure_registries {
            if registry.is_empty() || registry.contains("://") || registry.contains('/') {
                return Err(InspectorError::Config {
                    field: "insecure_registries".to_owned(),
                    reason: format!("'{registry}' must be a bare host[:port]"),
                });
            }
        }

        if self.default_platform.is_unknown() {
            return Err(InspectorError::Config {
                field: "default_platform".to_owned(),
                reason: "must have a known os and architecture".to_owned(),
            });
        }

        Ok(())
    }
}

/// 이미지 인스펙터 설정 빌더
#[derive(Default)]
pub struct InspectorConfigBuilder {
    config: InspectorConfig,
}

impl InspectorConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// Docker 소켓 경로를 설정합니다.
    pub fn docker_socket(mut self, socket: impl Into<String>) -> Self {
        self.config.docker_socket = socket.into();
        self
    }

    /// HTTP 로 접근할 레지스트리를 추가합니다.
    pub fn insecure_registry(mut self, registry: impl Into<String>) -> Self {
        self.config.insecure_registries.push(registry.into());
        self
    }

    /// 기본 플랫폼을 설정합니다.
    pub fn default_platform(mut self, platform: Platform) -> Self {
        self.config.default_platform = platform;
        self
    }

    /// Docker 요청 타임아웃(초)을 설정합니다.
    pub fn docker_timeout_secs(mut self, secs: u64) -> Self {
        self.config.docker_timeout_secs = secs;
        self
    }

    /// 설정을 검증하고 `InspectorConfig`를 생성합니다.
    pub fn build(self) -> Result<InspectorConfig, InspectorError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
