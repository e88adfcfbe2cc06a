#![doc = include_str!("../README.md")]
//!
//! # 모듈 구조
//!
//! - [`error`]: 도메인 에러 타입 (`EngineError`)
//! - [`config`]: 엔진 설정 (`EngineConfig`, 빌더)
//! - [`runner`]: 외부 도구 실행 (`ToolRunner` 트레이트, `ProcessRunner`)
//! - [`scanner`]: 스캐너 호출 구성
//! - [`patcher`]: 패처 호출 구성
//! - [`naming`]: 결과 이미지 이름 규칙, Comprehensive 플랫폼 예측
//! - [`workspace`]: 요청별 임시 디렉토리
//! - [`vex`]: VEX 문서 집계
//! - [`summary`]: 요약 텍스트
//! - [`orchestrator`]: 상태 머신 (`PatchOrchestrator`)
//!
//! # 아키텍처
//!
//! ```text
//! PatchRequest ──> select_mode / validate_request
//!                        │
//!          ┌─────────────┴──────────────┐
//!          ▼                            ▼
//!  TopologyInspector            Workspace + scanner (플랫폼별, DigestResolver)
//!          │                            │
//!          └──────────> patcher <───────┘
//!                          │
//!                 VEX 집계 (report-based)
//!                          │
//!                    PatchOutcome ──> format_summary
//! ```

pub mod config;
pub mod error;
pub mod naming;
pub mod orchestrator;
pub mod patcher;
pub mod runner;
pub mod scanner;
pub mod summary;
pub mod vex;
pub mod workspace;

// --- Public API Re-exports ---

// 설정
pub use config::{EngineConfig, EngineConfigBuilder};

// 에러
pub use error::EngineError;

// 오케스트레이터
pub use orchestrator::{PatchOrchestrator, PatchOrchestratorBuilder, PatchState, preflight};

// 외부 도구
pub use runner::{ProcessRunner, ToolInvocation, ToolOutput, ToolRunner};

// 결과
pub use summary::format_summary;
pub use vex::{VexCounts, parse_vex_document, summarize_vex};
