//! `copapatch patch*` command handlers
//!
//! Every patch entry point builds a [`PatchRequest`] and hands it to the
//! orchestrator together with its [`EntryPoint`]; mode selection happens there.

use std::io::Write;

use serde::Serialize;
use tracing::info;

use copapatch_core::types::{EntryPoint, PatchOutcome, PatchRequest};
use copapatch_core::CopapatchConfig;
use copapatch_engine::{format_summary, preflight};

use crate::cli::{PatchArgs, PlatformsArgs, TargetArgs, VulnerabilitiesArgs};
use crate::commands::build_orchestrator;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute a patch request through the production orchestrator.
pub async fn execute(
    request: PatchRequest,
    entry: EntryPoint,
    config: &CopapatchConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(image = %request.image, %entry, "patch requested");

    // 데몬 연결 전에 입력 오류를 먼저 보고
    preflight(&request, entry)?;
    let orchestrator = build_orchestrator(config)?;
    let outcome = orchestrator.run(&request, entry).await?;

    writer.render(&PatchReport::new(outcome))
}

fn base_request(target: TargetArgs) -> PatchRequest {
    let mut request = PatchRequest::new(target.image).with_push(target.push);
    if let Some(tag) = target.tag {
        request = request.with_tag(tag);
    }
    request
}

/// `patch`: legacy generic entry.
pub fn legacy_request(args: PatchArgs) -> PatchRequest {
    let mut request = base_request(args.target)
        .with_scan(args.scan)
        .with_platforms(args.platforms);
    if let Some(report) = args.report {
        request = request.with_report_path(report);
    }
    request
}

/// `patch-comprehensive`
pub fn comprehensive_request(args: TargetArgs) -> PatchRequest {
    base_request(args)
}

/// `patch-platforms`
pub fn platforms_request(args: PlatformsArgs) -> PatchRequest {
    base_request(args.target).with_platforms(args.platforms)
}

/// `patch-vulnerabilities`
pub fn vulnerabilities_request(args: VulnerabilitiesArgs) -> PatchRequest {
    let mut request = base_request(args.target).with_platforms(args.platforms);
    if let Some(report) = args.report {
        request = request.with_report_path(report);
    }
    request
}

/// Patch result: formatted summary plus the structured outcome.
#[derive(Serialize)]
pub struct PatchReport {
    pub summary: String,
    pub outcome: PatchOutcome,
}

impl PatchReport {
    pub fn new(outcome: PatchOutcome) -> Self {
        Self {
            summary: format_summary(&outcome),
            outcome,
        }
    }
}

impl Render for PatchReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for (i, line) in self.summary.lines().enumerate() {
            if i == 0 {
                writeln!(w, "{}", line.green().bold())?;
            } else if line.starts_with("Warning:") {
                writeln!(w, "{}", line.yellow())?;
            } else {
                writeln!(w, "{line}")?;
            }
        }
        Ok(())
    }
}
