//! 실행 모드 선택 및 요청 검증
//!
//! [`select_mode`]는 `(scan, report_path, platforms, entry)` 에만 의존하는 순수 함수입니다.
//! 범용 진입점에서는 스캔이 플랫폼 선택보다 우선하며, 전용 진입점은 이 우선순위를
//! 거치지 않습니다.

use crate::error::CopapatchError;
use crate::types::{EntryPoint, ExecutionMode, PatchRequest};

/// 요청과 진입점으로 실행 모드를 결정합니다.
pub fn select_mode(request: &PatchRequest, entry: EntryPoint) -> ExecutionMode {
    match entry {
        EntryPoint::Vulnerabilities => ExecutionMode::ReportBased,
        EntryPoint::PlatformSelective if !request.platforms.is_empty() => {
            ExecutionMode::PlatformSelective
        }
        EntryPoint::Generic if request.scan || request.report_path.is_some() => {
            ExecutionMode::ReportBased
        }
        EntryPoint::Generic | EntryPoint::Comprehensive | EntryPoint::PlatformSelective => {
            ExecutionMode::Comprehensive
        }
    }
}

/// 외부 도구를 호출하기 전에 요청을 검증합니다.
///
/// 실패한 요청은 어떤 단계도 부분 실행되지 않습니다.
pub fn validate_request(
    request: &PatchRequest,
    entry: EntryPoint,
    mode: ExecutionMode,
) -> Result<(), CopapatchError> {
    if request.image.trim().is_empty() {
        return Err(CopapatchError::InvalidInput(
            "image parameter is required".to_owned(),
        ));
    }

    if entry == EntryPoint::PlatformSelective && request.platforms.is_empty() {
        return Err(CopapatchError::InvalidInput(
            "at least one platform must be specified for platform-selective patching".to_owned(),
        ));
    }

    if let Some(tag) = &request.tag {
        if tag.is_empty() || tag.contains(['/', ':', '@']) {
            return Err(CopapatchError::InvalidInput(format!(
                "invalid output tag '{tag}'"
            )));
        }
    }

    if mode == ExecutionMode::ReportBased {
        if let Some(path) = &request.report_path {
            if path.as_os_str().is_empty() {
                return Err(CopapatchError::InvalidInput(
                    "report path must not be empty".to_owned(),
                ));
            }
            if !path.exists() {
                return Err(CopapatchError::InvalidInput(format!(
                    "report path does not exist: {}",
                    path.display()
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    fn arm64() -> Platform {
        "linux/arm64".parse().unwrap()
    }

    #[test]
    fn scan_dominates_platforms_on_generic_entry() {
        let request = PatchRequest::new("alpine:3.17")
            .with_scan(true)
            .with_platforms(vec![arm64()]);
        assert_eq!(
            select_mode(&request, EntryPoint::Generic),
            ExecutionMode::ReportBased
        );
    }

    #[test]
    fn plain_generic_request_is_comprehensive() {
        let request = PatchRequest::new("alpine:3.17");
        assert_eq!(
            select_mode(&request, EntryPoint::Generic),
            ExecutionMode::Comprehensive
        );
    }

    #[test]
    fn generic_entry_with_platforms_only_stays_comprehensive() {
        let request = PatchRequest::new("alpine:3.17").with_platforms(vec![arm64()]);
        assert_eq!(
            select_mode(&request, EntryPoint::Generic),
            ExecutionMode::Comprehensive
        );
    }

    #[test]
    fn report_path_makes_generic_request_report_based() {
        let request = PatchRequest::new("alpine:3.17").with_report_path("");
        assert_eq!(
            select_mode(&request, EntryPoint::Generic),
            ExecutionMode::ReportBased
        );
    }

    #[test]
    fn platform_entry_bypasses_scan_priority() {
        let request = PatchRequest::new("alpine:3.17")
            .with_scan(true)
            .with_platforms(vec![arm64()]);
        assert_eq!(
            select_mode(&request, EntryPoint::PlatformSelective),
            ExecutionMode::PlatformSelective
        );
    }

    #[test]
    fn dedicated_entries_fix_their_mode() {
        let request = PatchRequest::new("alpine:3.17");
        assert_eq!(
            select_mode(&request, EntryPoint::Vulnerabilities),
            ExecutionMode::ReportBased
        );
        assert_eq!(
            select_mode(&request, EntryPoint::Comprehensive),
            ExecutionMode::Comprehensive
        );
    }

    #[test]
    fn empty_image_is_rejected() {
        let request = PatchRequest::new("  ");
        let err = validate_request(&request, EntryPoint::Generic, ExecutionMode::Comprehensive)
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid input: image parameter is required");
    }

    #[test]
    fn platform_entry_requires_platforms() {
        let request = PatchRequest::new("alpine:3.17");
        let mode = select_mode(&request, EntryPoint::PlatformSelective);
        let err = validate_request(&request, EntryPoint::PlatformSelective, mode).unwrap_err();
        assert!(err.to_string().contains("at least one platform"));
    }

    #[test]
    fn empty_report_path_is_rejected() {
        let request = PatchRequest::new("alpine:3.17")
            .with_scan(true)
            .with_report_path("");
        let mode = select_mode(&request, EntryPoint::Generic);
        let err = validate_request(&request, EntryPoint::Generic, mode).unwrap_err();
        assert!(matches!(err, CopapatchError::InvalidInput(_)));
        assert!(err.to_string().contains("report path must not be empty"));
    }

    #[test]
    fn missing_report_path_is_rejected() {
        let request =
            PatchRequest::new("alpine:3.17").with_report_path("/nonexistent/copapatch/report.json");
        let err = validate_request(&request, EntryPoint::Vulnerabilities, ExecutionMode::ReportBased)
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn bad_output_tag_is_rejected() {
        let request = PatchRequest::new("alpine:3.17").with_tag("repo:tag");
        assert!(
            validate_request(&request, EntryPoint::Comprehensive, ExecutionMode::Comprehensive)
                .is_err()
        );
    }

    #[test]
    fn valid_request_passes() {
        let request = PatchRequest::new("alpine:3.17").with_platforms(vec![arm64()]);
        validate_request(
            &request,
            EntryPoint::PlatformSelective,
            ExecutionMode::PlatformSelective,
        )
        .unwrap();
    }
}
