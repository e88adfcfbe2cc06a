//! 호출자에게 돌려주는 요약 텍스트

use copapatch_core::types::PatchOutcome;

/// Comprehensive 모드에서 멀티 플랫폼 이미지를 패치했을 때 붙는 안내
pub const MULTI_PLATFORM_NOTE: &str = "Note: Multiplatform image detected. Copa creates separate images for each supported platform with architecture suffixes (e.g., -amd64, -arm64, etc.)";

/// 패치 결과를 줄 단위 요약으로 만듭니다. 같은 입력이면 항상 같은 출력입니다.
pub fn format_summary(outcome: &PatchOutcome) -> String {
    let mut lines = vec![format!(
        "Successfully patched image: {}",
        outcome.original_image
    )];

    if outcome.vex_generated {
        lines.push(format!(
            "Vulnerabilities fixed: {}",
            outcome.fixed_vulnerability_count
        ));
        lines.push(format!(
            "Packages updated: {}",
            outcome.updated_package_count
        ));
    }

    lines.push(format!(
        "New patched image(s): {}",
        outcome.result_image_names.join(", ")
    ));

    if !outcome.unverified_images.is_empty() {
        lines.push(format!(
            "Warning: expected image(s) not found after patching: {}",
            outcome.unverified_images.join(", ")
        ));
    }

    if !outcome.notes.is_empty() {
        lines.push(String::new());
        lines.extend(outcome.notes.iter().cloned());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> PatchOutcome {
        PatchOutcome {
            original_image: "alpine:3.17".to_owned(),
            result_image_names: vec!["alpine:3.17-patched".to_owned()],
            ..PatchOutcome::default()
        }
    }

    #[test]
    fn minimal_summary() {
        assert_eq!(
            format_summary(&outcome()),
            "Successfully patched image: alpine:3.17\nNew patched image(s): alpine:3.17-patched"
        );
    }

    #[test]
    fn vex_counts_are_listed_when_generated() {
        let outcome = PatchOutcome {
            vex_generated: true,
            fixed_vulnerability_count: 4,
            updated_package_count: 6,
            ..outcome()
        };
        let summary = format_summary(&outcome);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[1], "Vulnerabilities fixed: 4");
        assert_eq!(lines[2], "Packages updated: 6");
    }

    #[test]
    fn counts_hidden_without_vex() {
        let outcome = PatchOutcome {
            fixed_vulnerability_count: 4,
            ..outcome()
        };
        assert!(!format_summary(&outcome).contains("Vulnerabilities fixed"));
    }

    #[test]
    fn names_joined_and_notes_after_blank_line() {
        let outcome = PatchOutcome {
            result_image_names: vec![
                "nginx:1.25-patched-amd64".to_owned(),
                "nginx:1.25-patched-arm64".to_owned(),
            ],
            notes: vec![MULTI_PLATFORM_NOTE.to_owned()],
            ..outcome()
        };
        let summary = format_summary(&outcome);
        assert!(summary.contains(
            "New patched image(s): nginx:1.25-patched-amd64, nginx:1.25-patched-arm64\n\nNote:"
        ));
    }

    #[test]
    fn unverified_images_are_warned() {
        let outcome = PatchOutcome {
            unverified_images: vec!["alpine:3.17-patched".to_owned()],
            ..outcome()
        };
        assert!(format_summary(&outcome).ends_with(
            "Warning: expected image(s) not found after patching: alpine:3.17-patched"
        ));
    }
}
