//! 패처 (copa) 호출 구성

use std::path::Path;

use copapatch_core::platform::Platform;

use crate::config::EngineConfig;
use crate::runner::ToolInvocation;

/// 로그, 메트릭, 에러 메시지에 쓰이는 패처 이름
pub const PATCHER_TOOL: &str = "copa";

/// 리포트 기반 패치에 넘기는 입력/출력 경로
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    /// 리포트 파일 또는 리포트 디렉토리
    pub report: &'a Path,
    /// VEX 문서 출력 경로
    pub vex_output: &'a Path,
}

/// 패치 한 번의 인자
#[derive(Debug, Clone, Copy)]
pub struct PatchArgs<'a> {
    pub image: &'a str,
    pub tag: &'a str,
    pub push: bool,
    /// 비어 있으면 `--platform` 을 넘기지 않음
    pub platforms: &'a [Platform],
    /// `None` 이면 식별된 모든 패키지를 업데이트하며 VEX 가 생성되지 않음
    pub report: Option<ReportInput<'a>>,
}

/// 패처 호출을 구성합니다.
///
/// `patch --image <img> [--report <path> --output <vex>] [--tag T] [--push] [--platform a,b]`
pub fn patch_invocation(config: &EngineConfig, args: &PatchArgs<'_>) -> ToolInvocation {
    let mut invocation = ToolInvocation::new(PATCHER_TOOL, &config.patcher_binary)
        .args(["patch", "--image", args.image]);

    if let Some(report) = args.report {
        invocation = invocation
            .arg("--report")
            .arg(report.report.display().to_string())
            .arg("--output")
            .arg(report.vex_output.display().to_string());
    }

    invocation = invocation.arg("--tag").arg(args.tag);

    if args.push {
        invocation = invocation.arg("--push");
    }

    if !args.platforms.is_empty() {
        let joined = args
            .platforms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        invocation = invocation.arg("--platform").arg(joined);
    }

    invocation
}

/// `<patcher> --version`
pub fn version_invocation(config: &EngineConfig) -> ToolInvocation {
    ToolInvocation::new(PATCHER_TOOL, &config.patcher_binary).arg("--version")
}
