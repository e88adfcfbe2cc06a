//! 결과 이미지 이름 규칙과 Comprehensive 모드 플랫폼 예측
//!
//! 패처가 실제로 만든 이미지 목록은 알 수 없으므로, 이름은 요청과 토폴로지만으로
//! 계산합니다. 로컬 검증이 켜져 있으면 오케스트레이터가 계산된 이름을 확인합니다.

use copapatch_core::platform::{self, Platform};
use copapatch_core::reference::ImageReference;
use copapatch_core::types::ImageTopology;

/// 다이제스트 참조에 태그를 지정하지 않았을 때의 결과 태그
pub const DIGEST_OUTPUT_TAG: &str = "patched";

/// 결과 이미지 태그
///
/// 명시한 태그가 있으면 그대로, 없으면 `<원래 태그><suffix>` 입니다.
pub fn output_tag(reference: &ImageReference, explicit: Option<&str>, suffix: &str) -> String {
    match (explicit, reference.tag()) {
        (Some(tag), _) => tag.to_owned(),
        (None, Some(original)) => format!("{original}{suffix}"),
        (None, None) => DIGEST_OUTPUT_TAG.to_owned(),
    }
}

/// 결과 이미지 이름 목록
///
/// `platforms` 가 비어 있으면 `repository:tag` 하나, 아니면 플랫폼마다
/// `repository:tag-<arch_suffix>` 를 순서대로 만듭니다.
pub fn result_image_names(repository: &str, tag: &str, platforms: &[Platform]) -> Vec<String> {
    if platforms.is_empty() {
        return vec![format!("{repository}:{tag}")];
    }
    platforms
        .iter()
        .map(|p| format!("{repository}:{tag}-{}", p.arch_suffix()))
        .collect()
}

/// Comprehensive 모드에서 패처가 만들 플랫폼을 예측합니다.
///
/// - 로컬 멀티 플랫폼: 지원 카탈로그 전체
/// - 원격 멀티 플랫폼: 인덱스에 실제로 있는 카탈로그 플랫폼
/// - 단일 플랫폼: 첫 번째 사용 가능한 플랫폼, 없으면 `default`
pub fn predict_comprehensive_platforms(
    topology: &ImageTopology,
    default: &Platform,
) -> Vec<Platform> {
    match (topology.is_multi_platform, topology.is_local) {
        (true, true) => platform::all(),
        (true, false) => platform::all()
            .into_iter()
            .filter(|c| topology.available_platforms.iter().any(|p| p.matches(c)))
            .collect(),
        (false, _) => vec![
            topology
                .available_platforms
                .first()
                .cloned()
                .unwrap_or_else(|| default.clone()),
        ],
    }
}

/// 예측 결과가 플랫폼별 이름을 써야 하는지 여부
pub fn is_multi_output(topology: &ImageTopology, predicted: &[Platform]) -> bool {
    topology.is_multi_platform || predicted.len() > 1
}
