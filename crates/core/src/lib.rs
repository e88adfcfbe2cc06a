#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod metrics;
pub mod mode;
pub mod platform;
pub mod reference;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{
    ConfigError, CopapatchError, DocumentError, InspectionError, ReferenceError, ToolError,
};

// 설정
pub use config::CopapatchConfig;

// 모드 선택
pub use mode::{select_mode, validate_request};

// 도메인 타입
pub use platform::Platform;
pub use reference::ImageReference;
pub use types::{EntryPoint, ExecutionMode, ImageTopology, PatchOutcome, PatchRequest};
