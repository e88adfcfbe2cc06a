//! 도메인 타입 — 패치 요청, 실행 모드, 이미지 토폴로지, 결과
//!
//! 모든 크레이트가 공유하는 데이터 구조를 정의합니다.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::platform::{Platform, dedup_ordered};

/// 요청 하나를 처리하는 실행 모드
///
/// 요청당 한 번 결정되며 처리 중에 바뀌지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// 스캔 없이 이미지의 모든 지원 플랫폼, 모든 패키지 업데이트
    Comprehensive,
    /// 스캔 결과로 식별된 취약점만 패치
    ReportBased,
    /// 지정한 플랫폼만 패치, 나머지는 그대로 유지
    PlatformSelective,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comprehensive => "comprehensive",
            Self::ReportBased => "report-based",
            Self::PlatformSelective => "platform-selective",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 요청을 받은 호출 진입점
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryPoint {
    /// 레거시 `patch` 진입점: scan / report 여부로 모드 결정
    Generic,
    /// `patch-comprehensive`
    Comprehensive,
    /// `patch-platforms`
    PlatformSelective,
    /// `patch-vulnerabilities`
    Vulnerabilities,
}

impl EntryPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "patch",
            Self::Comprehensive => "patch-comprehensive",
            Self::PlatformSelective => "patch-platforms",
            Self::Vulnerabilities => "patch-vulnerabilities",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 호출자가 전달한 패치 요청
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRequest {
    /// 이미지 참조 문자열
    pub image: String,
    /// 결과 이미지 태그 (없으면 `<원래 태그>-patched`)
    pub tag: Option<String>,
    /// 결과 이미지 push 여부
    pub push: bool,
    /// 플랫폼 필터 (순서 유지, 중복 없음)
    pub platforms: Vec<Platform>,
    /// 패치 전 스캔 수행 여부
    pub scan: bool,
    /// 이미 존재하는 취약점 리포트 경로 (파일 또는 디렉토리)
    pub report_path: Option<PathBuf>,
}

impl PatchRequest {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_push(mut self, push: bool) -> Self {
        self.push = push;
        self
    }

    /// 플랫폼 필터를 설정합니다. 중복은 첫 항목만 남깁니다.
    pub fn with_platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms = dedup_ordered(platforms);
        self
    }

    pub fn with_scan(mut self, scan: bool) -> Self {
        self.scan = scan;
        self
    }

    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }
}

/// 요청 시점의 이미지 구조
///
/// 요청마다 새로 계산하며 캐시하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageTopology {
    /// 로컬 이미지 저장소에 존재하는지 여부
    pub is_local: bool,
    /// 매니페스트 리스트 / OCI 인덱스인지 여부
    pub is_multi_platform: bool,
    /// 사용 가능한 플랫폼 (순서 유지, 중복 및 unknown 제외)
    pub available_platforms: Vec<Platform>,
}

/// 패치 실행 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatchOutcome {
    /// 원본 이미지 참조
    pub original_image: String,
    /// 사용된 실행 모드
    pub mode: Option<ExecutionMode>,
    /// 결과 이미지 이름 (순서 유지)
    pub result_image_names: Vec<String>,
    /// 패치 대상 플랫폼 (Comprehensive 모드에서 필터가 없으면 예측값)
    pub patched_platforms: Vec<Platform>,
    /// 패처에 전달한 리포트 경로 (파일 또는 디렉토리)
    pub report_path: Option<String>,
    /// 생성된 VEX 문서 경로
    ///
    /// 작업 디렉토리 안의 경로는 요청이 끝나면 함께 삭제됩니다.
    pub vex_path: Option<String>,
    /// 수정된 취약점 수
    pub fixed_vulnerability_count: usize,
    /// 업데이트된 패키지 수
    pub updated_package_count: usize,
    /// 스캔 수행 여부
    pub scan_performed: bool,
    /// VEX 문서 생성 여부
    pub vex_generated: bool,
    /// 요약 끝에 붙는 안내 문구
    pub notes: Vec<String>,
    /// 패치 후 로컬에서 찾지 못한 예상 결과 이미지
    pub unverified_images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_platforms_removes_duplicates_in_order() {
        let arm64: Platform = "linux/arm64".parse().unwrap();
        let amd64: Platform = "linux/amd64".parse().unwrap();
        let request = PatchRequest::new("alpine:3.17").with_platforms(vec![
            arm64.clone(),
            amd64.clone(),
            arm64.clone(),
        ]);
        assert_eq!(request.platforms, vec![arm64, amd64]);
    }

    #[test]
    fn with_platforms_collapses_arm64_v8() {
        let request = PatchRequest::new("alpine:3.17").with_platforms(vec![
            "linux/arm64".parse().unwrap(),
            "linux/arm64/v8".parse().unwrap(),
        ]);
        assert_eq!(request.platforms.len(), 1);
        assert_eq!(request.platforms[0].to_string(), "linux/arm64");
    }

    #[test]
    fn mode_strings_are_kebab_case() {
        assert_eq!(ExecutionMode::ReportBased.to_string(), "report-based");
        assert_eq!(
            serde_json::to_string(&ExecutionMode::PlatformSelective).unwrap(),
            "\"platform-selective\""
        );
        assert_eq!(EntryPoint::PlatformSelective.as_str(), "patch-platforms");
    }

    #[test]
    fn request_builder_sets_fields() {
        let request = PatchRequest::new("nginx:1.25")
            .with_tag("fixed")
            .with_push(true)
            .with_scan(true)
            .with_report_path("/tmp/report.json");
        assert_eq!(request.tag.as_deref(), Some("fixed"));
        assert!(request.push);
        assert!(request.scan);
        assert_eq!(request.report_path, Some(PathBuf::from("/tmp/report.json")));
    }
}
