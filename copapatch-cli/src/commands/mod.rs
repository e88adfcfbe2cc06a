//! Command handlers -- one module per subcommand

pub mod config;
pub mod inspect;
pub mod patch;
pub mod version;

use std::sync::Arc;

use copapatch_core::CopapatchConfig;
use copapatch_engine::{EngineConfig, PatchOrchestrator, PatchOrchestratorBuilder, ProcessRunner};
use copapatch_image_inspector::{BollardImageStore, InspectorConfig, OciManifestSource};

use crate::error::CliError;

/// Production orchestrator: Docker daemon, OCI registry client, real processes.
pub type Orchestrator = PatchOrchestrator<BollardImageStore, OciManifestSource, ProcessRunner>;

/// Wire the production collaborators from the loaded configuration.
pub fn build_orchestrator(config: &CopapatchConfig) -> Result<Orchestrator, CliError> {
    let inspector_config = InspectorConfig::from_core(&config.registry);
    inspector_config.validate()?;

    let store = Arc::new(BollardImageStore::from_config(&inspector_config)?);
    let source = Arc::new(OciManifestSource::from_config(&inspector_config));

    let orchestrator = PatchOrchestratorBuilder::new()
        .config(EngineConfig::from_core(config))
        .image_store(store)
        .manifest_source(source)
        .tool_runner(Arc::new(ProcessRunner::new()))
        .default_platform(inspector_config.default_platform)
        .build()?;
    Ok(orchestrator)
}
