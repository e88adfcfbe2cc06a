//! 취약점 스캐너 (trivy) 호출 구성
//!
//! 플랫폼마다 리포트 파일 하나를 작업 디렉토리의 `reports/` 아래에 씁니다.
//! 패처는 이 디렉토리 전체를 `--report` 로 받습니다.

use std::path::Path;

use copapatch_core::platform::Platform;

use crate::config::EngineConfig;
use crate::runner::ToolInvocation;

/// 로그, 메트릭, 에러 메시지에 쓰이는 스캐너 이름
pub const SCANNER_TOOL: &str = "trivy";

/// 플랫폼 필터가 없을 때의 리포트 파일 이름
pub const UNSCOPED_REPORT: &str = "report.json";

/// 플랫폼별 리포트 파일 이름 (`linux/arm/v7` → `linux-arm-v7.json`)
pub fn report_file_name(platform: Option<&Platform>) -> String {
    match platform {
        Some(platform) => format!("{}.json", platform.to_string().replace('/', "-")),
        None => UNSCOPED_REPORT.to_owned(),
    }
}

/// 스캐너 호출을 구성합니다.
///
/// `image --vuln-type <types> [--ignore-unfixed] -f json [--platform p] -o <file> <image>`
pub fn scan_invocation(
    config: &EngineConfig,
    image: &str,
    platform: Option<&Platform>,
    output: &Path,
) -> ToolInvocation {
    let mut invocation = ToolInvocation::new(SCANNER_TOOL, &config.scanner_binary)
        .args(["image", "--vuln-type"])
        .arg(config.vuln_types.join(","));

    if config.ignore_unfixed {
        invocation = invocation.arg("--ignore-unfixed");
    }
    invocation = invocation.args(["-f", "json"]);
    if let Some(platform) = platform {
        invocation = invocation.arg("--platform").arg(platform.to_string());
    }

    invocation
        .arg("-o")
        .arg(output.display().to_string())
        .arg(image)
}
