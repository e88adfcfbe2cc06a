//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 레코더 설치는 임베딩하는 애플리케이션의 몫입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `copapatch_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use copapatch_core::metrics;
//!
//! metrics::counter!(metrics::PATCH_REQUESTS_TOTAL, metrics::LABEL_MODE => "comprehensive")
//!     .increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 실행 모드 레이블 키 (comprehensive, report-based, platform-selective)
pub const LABEL_MODE: &str = "mode";

/// 외부 도구 레이블 키 (scanner, patcher)
pub const LABEL_TOOL: &str = "tool";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── 메트릭 이름 ────────────────────────────────────────────────────

/// 처리한 패치 요청 수 (counter, label: mode, result)
pub const PATCH_REQUESTS_TOTAL: &str = "copapatch_patch_requests_total";

/// 외부 도구 호출 수 (counter, label: tool, result)
pub const TOOL_INVOCATIONS_TOTAL: &str = "copapatch_tool_invocations_total";

/// 외부 도구 실행 시간 (histogram, 초, label: tool)
pub const TOOL_DURATION_SECONDS: &str = "copapatch_tool_duration_seconds";

/// 플랫폼 다이제스트 해석 실패로 원래 참조를 사용한 횟수 (counter)
pub const DIGEST_RESOLUTION_FALLBACKS_TOTAL: &str =
    "copapatch_digest_resolution_fallbacks_total";

/// VEX 기준 수정된 취약점 누적 수 (counter)
pub const VULNERABILITIES_FIXED_TOTAL: &str = "copapatch_vulnerabilities_fixed_total";

/// VEX 기준 업데이트된 패키지 누적 수 (counter)
pub const PACKAGES_UPDATED_TOTAL: &str = "copapatch_packages_updated_total";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 외부 도구 실행 시간 히스토그램 버킷 (초)
///
/// 스캔은 수 초, 멀티 플랫폼 패치는 수십 분까지 걸립니다.
pub const TOOL_DURATION_BUCKETS: [f64; 10] =
    [0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 900.0, 1800.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번 호출합니다. 레코더가 없으면 아무 일도 하지 않습니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        PATCH_REQUESTS_TOTAL,
        "Total number of patch requests handled, by execution mode and result"
    );
    describe_counter!(
        TOOL_INVOCATIONS_TOTAL,
        "Total number of scanner/patcher invocations, by tool and result"
    );
    describe_histogram!(
        TOOL_DURATION_SECONDS,
        "Wall-clock duration of external tool invocations in seconds"
    );
    describe_counter!(
        DIGEST_RESOLUTION_FALLBACKS_TOTAL,
        "Scans that fell back to the unresolved reference after digest resolution failed"
    );
    describe_counter!(
        VULNERABILITIES_FIXED_TOTAL,
        "Total number of vulnerabilities reported fixed in VEX documents"
    );
    describe_counter!(
        PACKAGES_UPDATED_TOTAL,
        "Total number of package updates reported in VEX documents"
    );
}
