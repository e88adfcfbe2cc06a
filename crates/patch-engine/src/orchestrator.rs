//! 패치 오케스트레이터 -- 요청 하나의 전체 흐름 관리
//!
//! [`PatchOrchestrator`]는 요청을 검증하고 실행 모드를 정한 뒤, 토폴로지 조회,
//! 스캔, 패치, VEX 집계를 순서대로 수행하여 [`PatchOutcome`]을 만듭니다.
//!
//! # 상태 전이
//!
//! ```text
//!                  ┌──> Inspecting ──┐            (Comprehensive / PlatformSelective)
//! Start ──(검증)──┤                  ├──> Patching ──> Aggregating ──> Done
//!                  └──> Scanning ────┘            (ReportBased)
//!
//! 어느 단계에서든 에러 ──> Failed
//! ```
//!
//! 요청 하나는 하나의 순차 흐름으로 처리됩니다. 플랫폼별 스캔도 순차적이며,
//! 한 플랫폼의 스캔이 실패하면 요청 전체가 실패합니다. 재시도는 없습니다.

use std::path::PathBuf;
use std::sync::Arc;

use copapatch_core::metrics as m;
use copapatch_core::mode::{select_mode, validate_request};
use copapatch_core::platform::{self, Platform};
use copapatch_core::reference::ImageReference;
use copapatch_core::types::{
    EntryPoint, ExecutionMode, ImageTopology, PatchOutcome, PatchRequest,
};
use copapatch_image_inspector::{DigestResolver, ImageStore, ManifestSource, TopologyInspector};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::naming::{
    is_multi_output, output_tag, predict_comprehensive_platforms, result_image_names,
};
use crate::patcher::{PatchArgs, ReportInput, patch_invocation, version_invocation};
use crate::runner::{ToolRunner, run_checked};
use crate::scanner::{report_file_name, scan_invocation};
use crate::summary::MULTI_PLATFORM_NOTE;
use crate::vex::parse_vex_document;
use crate::workspace::Workspace;

/// 요청 처리 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchState {
    /// 검증 전
    Start,
    /// 이미지 토폴로지 조회 중
    Inspecting,
    /// 취약점 스캔 중 (또는 호출자 리포트 준비)
    Scanning,
    /// 패처 실행 중
    Patching,
    /// 결과 집계 중
    Aggregating,
    /// 완료
    Done,
    /// 실패
    Failed,
}

impl PatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Inspecting => "inspecting",
            Self::Scanning => "scanning",
            Self::Patching => "patching",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// 허용되는 전이인지 확인합니다.
    pub fn can_transition_to(&self, next: PatchState) -> bool {
        use PatchState::*;
        matches!(
            (self, next),
            (Start, Inspecting)
                | (Start, Scanning)
                | (Inspecting, Patching)
                | (Scanning, Patching)
                | (Patching, Aggregating)
                | (Aggregating, Done)
        ) || (next == Failed && !self.is_terminal())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl std::fmt::Display for PatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 요청 하나의 상태 기록
#[derive(Debug)]
struct StateTrack {
    current: PatchState,
}

impl StateTrack {
    fn new() -> Self {
        Self {
            current: PatchState::Start,
        }
    }

    fn advance(&mut self, next: PatchState) {
        debug_assert!(
            self.current.can_transition_to(next),
            "invalid transition {} -> {}",
            self.current,
            next
        );
        debug!(from = %self.current, to = %next, "state transition");
        self.current = next;
    }
}

/// 패치 대상 플랫폼 결정 결과
struct PatchPlan {
    /// 패처 `--platform` 으로 넘길 플랫폼 (비어 있으면 생략)
    patch_platforms: Vec<Platform>,
    /// 결과 이름을 플랫폼별로 만들 플랫폼 (비어 있으면 이름 하나)
    name_platforms: Vec<Platform>,
    /// 결과에 기록할 대상 플랫폼
    target_platforms: Vec<Platform>,
    notes: Vec<String>,
}

/// 외부 단계 전에 요청을 검증하고 이미지 참조를 파싱합니다.
///
/// 요청 검증, 참조 파싱, 플랫폼 필터 검사 순서로 진행하며 데몬, 레지스트리,
/// 프로세스에 접근하지 않습니다. 협력 객체를 만들기 전에 호출해도 됩니다.
///
/// # Errors
///
/// - `EngineError::InvalidInput`: 잘못된 요청 또는 전부 미지원인 플랫폼 필터
/// - `EngineError::Reference`: 이미지 참조 파싱 실패
pub fn preflight(request: &PatchRequest, entry: EntryPoint) -> Result<ImageReference, EngineError> {
    let mode = select_mode(request, entry);
    validate_request(request, entry, mode)?;
    let reference = ImageReference::parse(&request.image)?;

    // 플랫폼 필터가 전부 미지원이면 조회 전에 거부
    if mode != ExecutionMode::ReportBased
        && !request.platforms.is_empty()
        && platform::filter_supported(&request.platforms).is_empty()
    {
        return Err(EngineError::InvalidInput(format!(
            "none of the requested platforms are supported: {}",
            join_platforms(&request.platforms)
        )));
    }

    Ok(reference)
}

/// 패치 오케스트레이터
///
/// 외부 경계(로컬 이미지 저장소, 레지스트리, 외부 도구)는 모두 트레이트로 주입됩니다.
/// 요청 간에 공유하는 가변 상태가 없으므로 `&self` 로 동시에 여러 요청을 처리할 수 있습니다.
pub struct PatchOrchestrator<S: ImageStore, M: ManifestSource, R: ToolRunner> {
    config: EngineConfig,
    store: Arc<S>,
    inspector: TopologyInspector<S>,
    resolver: DigestResolver<M>,
    runner: Arc<R>,
}

impl<S: ImageStore, M: ManifestSource, R: ToolRunner> PatchOrchestrator<S, M, R> {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 패치 요청 하나를 처리합니다.
    ///
    /// # Errors
    ///
    /// - `EngineError::InvalidInput`: 외부 도구 호출 전에 거부된 요청
    /// - `EngineError::Reference`: 이미지 참조 파싱 실패
    /// - `EngineError::Inspection`: 토폴로지 조회 실패
    /// - `EngineError::ToolSpawn` / `ToolFailed`: 스캐너/패처 실패
    /// - `EngineError::VexRead` / `VexParse`: VEX 문서 처리 실패
    pub async fn run(
        &self,
        request: &PatchRequest,
        entry: EntryPoint,
    ) -> Result<PatchOutcome, EngineError> {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "patch_request",
            %request_id,
            image = %request.image,
            entry = %entry
        );

        async {
            let mut state = StateTrack::new();
            let mode = select_mode(request, entry);

            let result = self.execute(request, entry, mode, &mut state).await;

            let label = match &result {
                Ok(_) => "success",
                Err(_) => "failure",
            };
            metrics::counter!(
                m::PATCH_REQUESTS_TOTAL,
                m::LABEL_MODE => mode.as_str(),
                m::LABEL_RESULT => label
            )
            .increment(1);

            if let Err(e) = &result {
                state.advance(PatchState::Failed);
                warn!(%mode, error = %e, "patch request failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    /// 패처 버전 문자열을 반환합니다.
    pub async fn version(&self) -> Result<String, EngineError> {
        let output = run_checked(self.runner.as_ref(), &version_invocation(&self.config)).await?;
        Ok(output.stdout.trim().to_owned())
    }

    async fn execute(
        &self,
        request: &PatchRequest,
        entry: EntryPoint,
        mode: ExecutionMode,
        state: &mut StateTrack,
    ) -> Result<PatchOutcome, EngineError> {
        // 검증 실패 시 어떤 외부 호출도 하지 않음
        let reference = preflight(request, entry)?;
        let tag = output_tag(
            &reference,
            request.tag.as_deref(),
            &self.config.patched_suffix,
        );
        let repository = reference.repository();

        info!(%mode, tag = %tag, "using execution mode");

        let mut outcome = PatchOutcome {
            original_image: request.image.clone(),
            mode: Some(mode),
            ..PatchOutcome::default()
        };

        match mode {
            ExecutionMode::Comprehensive | ExecutionMode::PlatformSelective => {
                state.advance(PatchState::Inspecting);
                let topology = self.inspector.inspect(&request.image).await?;
                let plan = self.plan(request, mode, &topology)?;

                state.advance(PatchState::Patching);
                let invocation = patch_invocation(
                    &self.config,
                    &PatchArgs {
                        image: &request.image,
                        tag: &tag,
                        push: request.push,
                        platforms: &plan.patch_platforms,
                        report: None,
                    },
                );
                run_checked(self.runner.as_ref(), &invocation).await?;

                // 리포트 없이 패치하면 VEX 가 생성되지 않음
                state.advance(PatchState::Aggregating);
                outcome.result_image_names =
                    result_image_names(&repository, &tag, &plan.name_platforms);
                outcome.patched_platforms = plan.target_platforms;
                outcome.notes = plan.notes;
            }
            ExecutionMode::ReportBased => {
                state.advance(PatchState::Scanning);
                let workspace = Workspace::create(self.config.temp_root.as_deref())?;

                let report_path: PathBuf = match &request.report_path {
                    Some(path) => {
                        info!(report = %path.display(), "using caller-supplied report, skipping scan");
                        path.clone()
                    }
                    None => {
                        self.scan(request, &reference, &workspace).await?;
                        outcome.scan_performed = true;
                        workspace.reports_dir()
                    }
                };

                state.advance(PatchState::Patching);
                let vex_path = workspace.vex_path();
                let invocation = patch_invocation(
                    &self.config,
                    &PatchArgs {
                        image: &request.image,
                        tag: &tag,
                        push: request.push,
                        platforms: &[],
                        report: Some(ReportInput {
                            report: &report_path,
                            vex_output: &vex_path,
                        }),
                    },
                );
                run_checked(self.runner.as_ref(), &invocation).await?;

                state.advance(PatchState::Aggregating);
                let counts = parse_vex_document(&vex_path).await?;
                info!(
                    fixed = counts.fixed_vulnerability_count,
                    packages = counts.updated_package_count,
                    "parsed VEX document"
                );
                metrics::counter!(m::VULNERABILITIES_FIXED_TOTAL)
                    .increment(counts.fixed_vulnerability_count as u64);
                metrics::counter!(m::PACKAGES_UPDATED_TOTAL)
                    .increment(counts.updated_package_count as u64);

                outcome.report_path = Some(report_path.display().to_string());
                outcome.vex_path = Some(vex_path.display().to_string());
                outcome.vex_generated = true;
                outcome.fixed_vulnerability_count = counts.fixed_vulnerability_count;
                outcome.updated_package_count = counts.updated_package_count;
                outcome.result_image_names =
                    result_image_names(&repository, &tag, &request.platforms);
                outcome.patched_platforms = request.platforms.clone();

                workspace.cleanup();
            }
        }

        if self.config.verify_outputs && !request.push {
            outcome.unverified_images = self.verify_outputs(&outcome.result_image_names).await;
        }

        state.advance(PatchState::Done);
        info!(
            images = %outcome.result_image_names.join(", "),
            "patch request completed"
        );
        Ok(outcome)
    }

    /// Comprehensive / PlatformSelective 모드의 대상 플랫폼을 정합니다.
    fn plan(
        &self,
        request: &PatchRequest,
        mode: ExecutionMode,
        topology: &ImageTopology,
    ) -> Result<PatchPlan, EngineError> {
        let mut notes = Vec::new();

        if mode == ExecutionMode::Comprehensive && topology.is_multi_platform {
            notes.push(MULTI_PLATFORM_NOTE.to_owned());
        }

        if request.platforms.is_empty() {
            // 필터 없는 Comprehensive: 패처가 만들 플랫폼을 예측
            let predicted =
                predict_comprehensive_platforms(topology, self.inspector.default_platform());
            info!(
                local = topology.is_local,
                multi_platform = topology.is_multi_platform,
                platforms = %join_platforms(&predicted),
                "predicted patched platforms"
            );
            let name_platforms = if is_multi_output(topology, &predicted) {
                predicted.clone()
            } else {
                Vec::new()
            };
            return Ok(PatchPlan {
                patch_platforms: Vec::new(),
                name_platforms,
                target_platforms: predicted,
                notes,
            });
        }

        let supported = platform::filter_supported(&request.platforms);
        for unsupported in platform::unsupported(&request.platforms) {
            warn!(platform = %unsupported, "platform is not supported by the patcher, skipping");
        }

        for missing in supported
            .iter()
            .filter(|p| !topology.available_platforms.iter().any(|a| a.matches(p)))
        {
            warn!(platform = %missing, "requested platform not found in image");
        }

        if mode == ExecutionMode::PlatformSelective {
            let preserved: Vec<Platform> = topology
                .available_platforms
                .iter()
                .filter(|a| !supported.iter().any(|p| p.matches(a)))
                .cloned()
                .collect();
            if !preserved.is_empty() {
                warn!(
                    platforms = %join_platforms(&preserved),
                    "platforms will be preserved unpatched"
                );
            }
        }

        info!(platforms = %join_platforms(&supported), "patching platforms");
        Ok(PatchPlan {
            patch_platforms: supported.clone(),
            name_platforms: supported.clone(),
            target_platforms: supported,
            notes,
        })
    }

    /// 플랫폼마다 순차적으로 스캔하여 `reports/` 에 리포트를 씁니다.
    async fn scan(
        &self,
        request: &PatchRequest,
        reference: &ImageReference,
        workspace: &Workspace,
    ) -> Result<(), EngineError> {
        let reports_dir = workspace.reports_dir();

        if request.platforms.is_empty() {
            let output = reports_dir.join(report_file_name(None));
            let invocation = scan_invocation(&self.config, &request.image, None, &output);
            run_checked(self.runner.as_ref(), &invocation).await?;
            return Ok(());
        }

        for platform in &request.platforms {
            let target = self.scan_target(request, reference, platform).await;
            let output = reports_dir.join(report_file_name(Some(platform)));
            let invocation = scan_invocation(&self.config, &target, Some(platform), &output);
            run_checked(self.runner.as_ref(), &invocation).await?;
            debug!(%platform, report = %output.display(), "scan finished");
        }
        Ok(())
    }

    /// 플랫폼 전용 다이제스트로 고정된 스캔 대상. 해석에 실패하면 원래 참조를 씁니다.
    async fn scan_target(
        &self,
        request: &PatchRequest,
        reference: &ImageReference,
        platform: &Platform,
    ) -> String {
        match self.resolver.resolve_platform_digest(reference, platform).await {
            Ok(resolved) => {
                debug!(%platform, resolved = %resolved, "scanning platform digest");
                resolved.to_string()
            }
            Err(e) => {
                warn!(%platform, error = %e, "could not resolve platform digest, using original reference");
                metrics::counter!(m::DIGEST_RESOLUTION_FALLBACKS_TOTAL).increment(1);
                request.image.clone()
            }
        }
    }

    /// 예상 결과 이미지가 로컬에 있는지 확인하고, 없는 이름을 반환합니다.
    async fn verify_outputs(&self, names: &[String]) -> Vec<String> {
        let mut missing = Vec::new();
        for name in names {
            if let Err(e) = self.store.inspect_local(name).await {
                warn!(image = %name, error = %e, "expected patched image not found");
                missing.push(name.clone());
            }
        }
        missing
    }
}

fn join_platforms(platforms: &[Platform]) -> String {
    platforms
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// [`PatchOrchestrator`] 빌더
pub struct PatchOrchestratorBuilder<S: ImageStore, M: ManifestSource, R: ToolRunner> {
    config: EngineConfig,
    store: Option<Arc<S>>,
    manifests: Option<Arc<M>>,
    runner: Option<Arc<R>>,
    default_platform: Platform,
}

impl<S: ImageStore, M: ManifestSource, R: ToolRunner> PatchOrchestratorBuilder<S, M, R> {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            store: None,
            manifests: None,
            runner: None,
            default_platform: Platform::host(),
        }
    }

    /// 엔진 설정을 지정합니다.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// 로컬 이미지 저장소를 설정합니다.
    pub fn image_store(mut self, store: Arc<S>) -> Self {
        self.store = Some(store);
        self
    }

    /// 레지스트리 매니페스트 소스를 설정합니다.
    pub fn manifest_source(mut self, source: Arc<M>) -> Self {
        self.manifests = Some(source);
        self
    }

    /// 외부 도구 러너를 설정합니다.
    pub fn tool_runner(mut self, runner: Arc<R>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// 레지스트리가 플랫폼을 알려주지 않을 때 쓸 기본 플랫폼 (기본값: 호스트)
    pub fn default_platform(mut self, platform: Platform) -> Self {
        self.default_platform = platform;
        self
    }

    /// 오케스트레이터를 빌드합니다.
    ///
    /// # Errors
    ///
    /// 설정이 유효하지 않거나 필수 구성 요소가 빠지면 `EngineError::Config`
    pub fn build(self) -> Result<PatchOrchestrator<S, M, R>, EngineError> {
        self.config.validate()?;

        let store = self.store.ok_or_else(|| missing("image_store"))?;
        let manifests = self.manifests.ok_or_else(|| missing("manifest_source"))?;
        let runner = self.runner.ok_or_else(|| missing("tool_runner"))?;

        Ok(PatchOrchestrator {
            config: self.config,
            inspector: TopologyInspector::new(Arc::clone(&store), self.default_platform),
            store,
            resolver: DigestResolver::new(manifests),
            runner,
        })
    }
}

impl<S: ImageStore, M: ManifestSource, R: ToolRunner> Default for PatchOrchestratorBuilder<S, M, R> {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(field: &str) -> EngineError {
    EngineError::Config {
        field: field.to_owned(),
        reason: format!("{field} must be provided"),
    }
}
