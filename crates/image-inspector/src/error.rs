//! 이미지 인스펙터 에러 타입
//!
//! [`InspectorError`]는 로컬 이미지 저장소, 레지스트리 조회, 다이제스트 해석 과정에서
//! 발생하는 모든 에러를 표현합니다. `From<InspectorError> for CopapatchError` 변환이
//! 구현되어 있어 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use copapatch_core::error::{CopapatchError, InspectionError, ReferenceError};

/// 이미지 인스펙터 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum InspectorError {
    /// Docker API 호출 실패
    #[error("docker api error: {0}")]
    DockerApi(String),

    /// Docker 소켓 연결 실패
    #[error("docker connection error: {0}")]
    DockerConnection(String),

    /// 로컬 저장소에 이미지가 없음
    #[error("image not found locally: {0}")]
    ImageNotFound(String),

    /// 원격 매니페스트를 가져올 수 없음
    #[error("manifest unavailable for '{image}': {reason}")]
    ManifestUnavailable {
        /// 조회 대상 이미지
        image: String,
        /// 실패 사유
        reason: String,
    },

    /// 인덱스에 요청한 플랫폼이 없음
    #[error("platform {platform} not found in manifest index for '{image}'")]
    PlatformNotFound {
        /// 조회 대상 이미지
        image: String,
        /// 요청한 플랫폼
        platform: String,
    },

    /// 로컬/원격 조회 모두 실패
    #[error("failed to inspect '{image}': {reason}")]
    InspectionFailed {
        /// 조회 대상 이미지
        image: String,
        /// 실패 사유 (로컬, 원격)
        reason: String,
    },

    /// 이미지 참조 파싱 실패
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<InspectorError> for CopapatchError {
    fn from(err: InspectorError) -> Self {
        match err {
            InspectorError::ManifestUnavailable { image, reason } => {
                CopapatchError::Inspection(InspectionError::ManifestUnavailable { image, reason })
            }
            InspectorError::PlatformNotFound { image, platform } => {
                CopapatchError::Inspection(InspectionError::PlatformNotFound { image, platform })
            }
            InspectorError::InspectionFailed { image, reason } => {
                CopapatchError::Inspection(InspectionError::Failed { image, reason })
            }
            InspectorError::Reference(e) => CopapatchError::Reference(e),
            InspectorError::Config { field, reason } => {
                CopapatchError::Config(copapatch_core::error::ConfigError::InvalidValue {
                    field,
                    reason,
                })
            }
            other @ (InspectorError::DockerApi(_)
            | InspectorError::DockerConnection(_)
            | InspectorError::ImageNotFound(_)) => {
                CopapatchError::Inspection(InspectionError::Failed {
                    image: String::new(),
                    reason: other.to_string(),
                })
            }
        }
    }
}
