//! 에러 타입 — 도메인별 에러 정의

/// copapatch 최상위 에러 타입
///
/// 각 도메인 크레이트(`copapatch-image-inspector`, `copapatch-engine`)의 에러는
/// `From` 구현을 통해 이 타입으로 변환됩니다.
#[derive(Debug, thiserror::Error)]
pub enum CopapatchError {
    /// 외부 도구 호출 전에 거부된 요청
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 이미지 참조 파싱 에러
    #[error("reference error: {0}")]
    Reference(#[from] ReferenceError),

    /// 이미지 토폴로지 조회 에러
    #[error("inspection error: {0}")]
    Inspection(#[from] InspectionError),

    /// 외부 스캐너/패처 실행 에러
    #[error("tool error: {0}")]
    Tool(#[from] ToolError),

    /// VEX 등 결과 문서 처리 에러
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 이미지 참조 / 플랫폼 문자열 파싱 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    /// 빈 참조 문자열
    #[error("image reference must not be empty")]
    Empty,

    /// 문법에 맞지 않는 이미지 참조
    #[error("invalid image reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    /// 문법에 맞지 않는 플랫폼 문자열
    #[error("invalid platform '{platform}': {reason}")]
    InvalidPlatform { platform: String, reason: String },
}

/// 이미지 토폴로지 / 매니페스트 조회 에러
#[derive(Debug, thiserror::Error)]
pub enum InspectionError {
    /// 로컬/원격 조회 모두 실패
    #[error("failed to inspect '{image}': {reason}")]
    Failed { image: String, reason: String },

    /// 인덱스에 요청한 플랫폼이 없음
    #[error("platform {platform} not found in manifest index for '{image}'")]
    PlatformNotFound { image: String, platform: String },

    /// 원격 매니페스트를 가져올 수 없음
    #[error("manifest unavailable for '{image}': {reason}")]
    ManifestUnavailable { image: String, reason: String },
}

/// 외부 도구 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// 프로세스를 시작하지 못함 (바이너리 없음, 권한 등)
    #[error("failed to start {tool}: {reason}")]
    Spawn { tool: String, reason: String },

    /// 0이 아닌 종료 코드
    #[error("{tool} command failed (exit code {exit_code}): {command}\n{stderr}")]
    Failed {
        tool: String,
        command: String,
        exit_code: i32,
        stderr: String,
    },
}

/// 결과 문서 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// 문서를 읽을 수 없음
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    /// 문서 형식 오류
    #[error("failed to parse {kind} document: {reason}")]
    Parse { kind: String, reason: String },
}
