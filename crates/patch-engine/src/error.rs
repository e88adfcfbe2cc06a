//! 패치 엔진 에러 타입
//!
//! [`EngineError`]는 요청 검증, 외부 도구 실행, VEX 문서 처리, 작업 디렉토리 관리
//! 과정에서 발생하는 에러를 표현합니다. `From<EngineError> for CopapatchError`
//! 변환으로 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use copapatch_core::error::{
    ConfigError, CopapatchError, DocumentError, ReferenceError, ToolError,
};
use copapatch_image_inspector::InspectorError;

/// 패치 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// 외부 도구 호출 전에 거부된 요청
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 외부 도구 프로세스를 시작하지 못함
    #[error("failed to start {tool}: {reason}")]
    ToolSpawn {
        /// 도구 이름 (trivy, copa)
        tool: String,
        /// 실패 사유
        reason: String,
    },

    /// 외부 도구가 0이 아닌 코드로 종료
    ///
    /// 명령줄, 종료 코드, stderr 는 가공하지 않고 그대로 전달합니다.
    #[error("{tool} command failed (exit code {exit_code}): {command}\n{stderr}")]
    ToolFailed {
        /// 도구 이름
        tool: String,
        /// 실행한 명령줄
        command: String,
        /// 종료 코드 (시그널로 종료된 경우 -1)
        exit_code: i32,
        /// 캡처한 stderr
        stderr: String,
    },

    /// VEX 문서를 읽을 수 없음
    #[error("failed to read VEX document {path}: {reason}")]
    VexRead {
        /// 문서 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// VEX 문서 형식 오류
    #[error("failed to parse VEX document: {0}")]
    VexParse(String),

    /// 요청별 작업 디렉토리 생성 실패
    #[error("workspace error: {0}")]
    Workspace(#[source] std::io::Error),

    /// 이미지 토폴로지 / 다이제스트 조회 실패
    #[error(transparent)]
    Inspection(#[from] InspectorError),

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

impl From<EngineError> for CopapatchError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidInput(msg) => CopapatchError::InvalidInput(msg),
            EngineError::ToolSpawn { tool, reason } => {
                CopapatchError::Tool(ToolError::Spawn { tool, reason })
            }
            EngineError::ToolFailed {
                tool,
                command,
                exit_code,
                stderr,
            } => CopapatchError::Tool(ToolError::Failed {
                tool,
                command,
                exit_code,
                stderr,
            }),
            EngineError::VexRead { path, reason } => {
                CopapatchError::Document(DocumentError::Read { path, reason })
            }
            EngineError::VexParse(reason) => CopapatchError::Document(DocumentError::Parse {
                kind: "VEX".to_owned(),
                reason,
            }),
            EngineError::Workspace(e) => CopapatchError::Io(e),
            EngineError::Inspection(e) => e.into(),
            EngineError::Reference(e) => CopapatchError::Reference(e),
            EngineError::Config { field, reason } => {
                CopapatchError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}

impl From<CopapatchError> for EngineError {
    fn from(err: CopapatchError) -> Self {
        match err {
            CopapatchError::InvalidInput(msg) => EngineError::InvalidInput(msg),
            CopapatchError::Reference(e) => EngineError::Reference(e),
            CopapatchError::Io(e) => EngineError::Workspace(e),
            other => EngineError::InvalidInput(other.to_string()),
        }
    }
}
